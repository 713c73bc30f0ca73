use api_types::catalog::{CategoryView, ItemView, ItemsQuery};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{ServerError, server::ServerState};

pub async fn categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories().await?;

    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryView {
                id: c.id,
                name: c.name,
            })
            .collect(),
    ))
}

pub async fn items(
    State(state): State<ServerState>,
    query: Result<Query<ItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<ItemView>>, ServerError> {
    let Query(query) =
        query.map_err(|_| ServerError::Generic("invalid query string".to_string()))?;
    let items = state
        .engine
        .list_items(query.category_id.as_deref())
        .await?;

    Ok(Json(
        items
            .into_iter()
            .map(|i| ItemView {
                id: i.id,
                name: i.name,
                unit: i.unit,
            })
            .collect(),
    ))
}
