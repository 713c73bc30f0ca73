//! Expense ledger endpoints.

use api_types::expense::{ExpenseCreated, ExpenseListQuery, ExpenseNew, ExpenseView};
use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{Caller, ExpenseRow};

use crate::{ServerError, server::ServerState};

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let Json(payload) = payload.map_err(|_| ServerError::Generic("invalid json".to_string()))?;

    let created = state
        .engine
        .create_expense(
            &payload.date,
            &payload.item_id,
            payload.quantity,
            payload.unit_price,
            &payload.note,
            &caller.user_id,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            id: created.id,
            total: created.total,
        }),
    ))
}

fn view(row: ExpenseRow) -> ExpenseView {
    ExpenseView {
        id: row.id,
        date: row.date,
        category_id: row.category_id,
        category: row.category,
        item: row.item,
        unit: row.unit,
        quantity: row.quantity,
        unit_price: row.unit_price,
        total: row.total,
        note: row.note,
        created_by: row.created_by,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let Query(query) =
        query.map_err(|_| ServerError::Generic("invalid query string".to_string()))?;
    let month = query
        .month
        .ok_or_else(|| ServerError::Generic("month is required (YYYY-MM)".to_string()))?;

    let rows = state
        .engine
        .list_expenses(&month, query.category_id.as_deref())
        .await?;

    Ok(Json(rows.into_iter().map(view).collect()))
}
