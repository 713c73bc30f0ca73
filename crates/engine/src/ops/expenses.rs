use chrono::Utc;
use sea_orm::{ActiveValue, FromQueryResult, Statement, Value, prelude::*};
use uuid::Uuid;

use crate::{CalendarDay, Month, ResultEngine, expenses, round2};

use super::{Engine, normalize_required_text, require_finite_amount, require_positive};

/// Format of `expenses.created_at`, fixed width so it sorts lexically.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

// Month matching is a prefix comparison on the stored date text, not a
// calendar range.
const LIST_SQL: &str = "SELECT
        e.id AS id,
        e.purchase_date AS date,
        c.id AS category_id,
        c.name AS category,
        i.name AS item,
        i.unit AS unit,
        e.quantity AS quantity,
        e.unit_price AS unit_price,
        e.total_price AS total,
        e.note AS note,
        u.name AS created_by
    FROM expenses e
    JOIN items i ON i.id = e.item_id
    JOIN categories c ON c.id = i.category_id
    JOIN users u ON u.id = e.created_by
    WHERE substr(e.purchase_date, 1, 7) = ?";

const LIST_ORDER_SQL: &str = " ORDER BY e.purchase_date DESC, e.created_at DESC, e.rowid DESC";

/// Returned by [`Engine::create_expense`] so callers can show the total
/// without reading the row back.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseCreated {
    pub id: String,
    pub total: f64,
}

/// An expense joined with its item, category and creator.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub category_id: String,
    pub category: String,
    pub item: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
    pub note: String,
    /// Display name of the creator.
    pub created_by: String,
}

impl Engine {
    /// Record a purchase.
    ///
    /// Input is validated before anything touches the store. The total is
    /// `round2(quantity * unit_price)`, persisted as is; a product that
    /// overflows `f64` is a validation error. An unknown item is rejected by
    /// the store's foreign key.
    pub async fn create_expense(
        &self,
        date: &str,
        item_id: &str,
        quantity: f64,
        unit_price: f64,
        note: &str,
        actor_id: &str,
    ) -> ResultEngine<ExpenseCreated> {
        let date: CalendarDay = date.parse()?;
        let item_id = normalize_required_text(item_id, "itemId")?;
        let quantity = require_positive(quantity, "quantity")?;
        let unit_price = require_positive(unit_price, "unitPrice")?;

        let total = require_finite_amount(round2(quantity * unit_price), "total")?;
        let id = Uuid::new_v4().to_string();

        let expense = expenses::ActiveModel {
            id: ActiveValue::Set(id.clone()),
            purchase_date: ActiveValue::Set(date.to_string()),
            item_id: ActiveValue::Set(item_id),
            quantity: ActiveValue::Set(quantity),
            unit_price: ActiveValue::Set(unit_price),
            total_price: ActiveValue::Set(total),
            note: ActiveValue::Set(note.trim().to_string()),
            created_by: ActiveValue::Set(actor_id.to_string()),
            created_at: ActiveValue::Set(Utc::now().format(CREATED_AT_FORMAT).to_string()),
        };
        expenses::Entity::insert(expense).exec(&self.database).await?;

        tracing::debug!("expense {id} recorded by {actor_id}: {total}");
        Ok(ExpenseCreated { id, total })
    }

    /// Expenses of a month, newest purchase first, then newest created first.
    ///
    /// `category_id` narrows the list to one category; blank means all.
    pub async fn list_expenses(
        &self,
        month: &str,
        category_id: Option<&str>,
    ) -> ResultEngine<Vec<ExpenseRow>> {
        let month: Month = month.parse()?;

        let mut sql = LIST_SQL.to_string();
        let mut values: Vec<Value> = vec![month.prefix().into()];
        if let Some(category_id) = category_id.map(str::trim).filter(|id| !id.is_empty()) {
            sql.push_str(" AND c.id = ?");
            values.push(category_id.into());
        }
        sql.push_str(LIST_ORDER_SQL);

        let rows = ExpenseRow::find_by_statement(Statement::from_sql_and_values(
            self.database.get_database_backend(),
            sql,
            values,
        ))
        .all(&self.database)
        .await?;

        Ok(rows)
    }
}
