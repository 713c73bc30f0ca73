use sea_orm::{
    ActiveValue, FromQueryResult, QueryFilter, Statement, sea_query::OnConflict, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Month, ResultEngine, monthly_budgets, round2};

use super::{Engine, require_finite_amount, require_positive};

const MONTH_TOTAL_SQL: &str = "SELECT COALESCE(SUM(total_price), 0.0) AS total
    FROM expenses
    WHERE substr(purchase_date, 1, 7) = ?";

const CATEGORY_TOTALS_SQL: &str = "SELECT
        c.id AS category_id,
        c.name AS category,
        COALESCE(SUM(e.total_price), 0.0) AS total
    FROM expenses e
    JOIN items i ON i.id = e.item_id
    JOIN categories c ON c.id = i.category_id
    WHERE substr(e.purchase_date, 1, 7) = ?
    GROUP BY c.id, c.name
    ORDER BY total DESC, c.name ASC";

#[derive(Debug, FromQueryResult)]
struct MonthTotal {
    total: f64,
}

/// Spend of one category in a month.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct CategoryTotal {
    pub category_id: String,
    pub category: String,
    pub total: f64,
}

/// Month dashboard figures.
///
/// `budget` is `None` when no ceiling was ever set, which is different from a
/// zero ceiling. `over_budget` compares the unrounded spend with the stored
/// ceiling; `total` and the category totals are rounded for display.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthlySummary {
    pub month: Month,
    pub total: f64,
    pub budget: Option<f64>,
    pub over_budget: bool,
    /// Only categories with spend in the month, largest first.
    pub by_category: Vec<CategoryTotal>,
}

impl Engine {
    /// Set the ceiling of a month, replacing any previous one.
    ///
    /// The ceiling is rounded to cents before it is stored and the setter is
    /// recorded. There is never more than one row per month.
    pub async fn set_budget(
        &self,
        month: &str,
        ceiling: f64,
        actor_id: &str,
    ) -> ResultEngine<f64> {
        let month: Month = month.parse()?;
        let ceiling = require_finite_amount(
            round2(require_positive(ceiling, "maxBudget")?),
            "maxBudget",
        )?;
        if ceiling <= 0.0 {
            return Err(EngineError::Validation(
                "maxBudget must be at least 0.01".to_string(),
            ));
        }

        let budget = monthly_budgets::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            month: ActiveValue::Set(month.first_day().to_string()),
            max_budget: ActiveValue::Set(ceiling),
            created_by: ActiveValue::Set(actor_id.to_string()),
        };
        monthly_budgets::Entity::insert(budget)
            .on_conflict(
                OnConflict::column(monthly_budgets::Column::Month)
                    .update_columns([
                        monthly_budgets::Column::MaxBudget,
                        monthly_budgets::Column::CreatedBy,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;

        tracing::info!("budget for {month} set to {ceiling} by {actor_id}");
        Ok(ceiling)
    }

    /// Spend, ceiling and per category breakdown of a month.
    pub async fn summary(&self, month: &str) -> ResultEngine<MonthlySummary> {
        let month: Month = month.parse()?;
        let backend = self.database.get_database_backend();
        let prefix: Value = month.prefix().into();

        let total = MonthTotal::find_by_statement(Statement::from_sql_and_values(
            backend,
            MONTH_TOTAL_SQL,
            [prefix.clone()],
        ))
        .one(&self.database)
        .await?
        .map_or(0.0, |row| row.total);

        let budget = monthly_budgets::Entity::find()
            .filter(monthly_budgets::Column::Month.eq(month.first_day().to_string()))
            .one(&self.database)
            .await?
            .map(|model| model.max_budget);

        let by_category = CategoryTotal::find_by_statement(Statement::from_sql_and_values(
            backend,
            CATEGORY_TOTALS_SQL,
            [prefix],
        ))
        .all(&self.database)
        .await?
        .into_iter()
        .map(|row| CategoryTotal {
            total: round2(row.total),
            ..row
        })
        .collect();

        Ok(MonthlySummary {
            month,
            total: round2(total),
            budget,
            over_budget: budget.is_some_and(|ceiling| total > ceiling),
            by_category,
        })
    }
}
