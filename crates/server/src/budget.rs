//! Monthly ceiling and the dashboard summary.

use api_types::{
    Ack,
    budget::{BudgetSet, CategorySpend, Summary, SummaryQuery},
};
use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use engine::Caller;

use crate::{ServerError, server::ServerState};

pub async fn set_budget(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    payload: Result<Json<BudgetSet>, JsonRejection>,
) -> Result<Json<Ack>, ServerError> {
    let Json(payload) = payload.map_err(|_| ServerError::Generic("invalid json".to_string()))?;

    state
        .engine
        .set_budget(&payload.month, payload.max_budget, &caller.user_id)
        .await?;

    Ok(Json(Ack { ok: true }))
}

pub async fn summary(
    State(state): State<ServerState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Summary>, ServerError> {
    let Query(query) =
        query.map_err(|_| ServerError::Generic("invalid query string".to_string()))?;
    let month = query
        .month
        .ok_or_else(|| ServerError::Generic("month is required (YYYY-MM)".to_string()))?;

    let summary = state.engine.summary(&month).await?;

    Ok(Json(Summary {
        month: summary.month.to_string(),
        total: summary.total,
        budget: summary.budget,
        over_budget: summary.over_budget,
        by_category: summary
            .by_category
            .into_iter()
            .map(|c| CategorySpend {
                category_id: c.category_id,
                category: c.category,
                total: c.total,
            })
            .collect(),
    }))
}
