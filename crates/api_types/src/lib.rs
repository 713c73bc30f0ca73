//! Wire types shared by the HTTP server and its clients.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of write endpoints with nothing else to report.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Me {
        pub user_id: String,
        pub name: String,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemsQuery {
        pub category_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: String,
        pub name: String,
        pub unit: String,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        /// Purchase day, `YYYY-MM-DD`.
        pub date: String,
        pub item_id: String,
        pub quantity: f64,
        pub unit_price: f64,
        #[serde(default)]
        pub note: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub id: String,
        pub total: f64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseListQuery {
        /// `YYYY-MM`.
        pub month: Option<String>,
        pub category_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
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
        /// Display name of the admin who recorded the expense.
        pub created_by: String,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetSet {
        /// `YYYY-MM`.
        pub month: String,
        pub max_budget: f64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryQuery {
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategorySpend {
        pub category_id: String,
        pub category: String,
        pub total: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Summary {
        pub month: String,
        pub total: f64,
        /// `null` when no ceiling was set for the month.
        pub budget: Option<f64>,
        pub over_budget: bool,
        pub by_category: Vec<CategorySpend>,
    }
}
