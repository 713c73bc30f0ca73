use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod auth;
mod budgets;
mod catalog;
mod expenses;

pub use access::{Caller, Role};
pub use auth::{AuthenticatedUser, Session, SessionIdentity};
pub use budgets::{CategoryTotal, MonthlySummary};
pub use catalog::{Category, Item, SeedReport};
pub use expenses::{ExpenseCreated, ExpenseRow};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Password used to compute the hash checked when an email is unknown.
const DUMMY_PASSWORD: &str = "larder-unknown-user";

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    bcrypt_cost: u32,
    /// Verified instead of a real hash for unknown emails, so a failed login
    /// costs the same whether or not the account exists.
    dummy_hash: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

/// Strictly positive and finite; `NaN` fails too.
fn require_positive(value: f64, label: &str) -> ResultEngine<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::Validation(format!("{label} must be > 0")))
    }
}

/// A computed amount that left the `f64` range cannot be stored.
fn require_finite_amount(value: f64, label: &str) -> ResultEngine<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::Validation(format!("{label} is out of range")))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    bcrypt_cost: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Work factor for password hashing, defaults to [`bcrypt::DEFAULT_COST`].
    pub fn bcrypt_cost(mut self, cost: u32) -> EngineBuilder {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let bcrypt_cost = self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(EngineError::Validation(
                "bcrypt cost must be between 4 and 31".to_string(),
            ));
        }
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, bcrypt_cost)?;

        Ok(Engine {
            database: self.database,
            bcrypt_cost,
            dummy_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(normalize_required_text("  Onion ", "name").unwrap(), "Onion");
        assert_eq!(
            normalize_required_text("   ", "itemId"),
            Err(EngineError::Validation("itemId is required".to_string()))
        );
    }

    #[test]
    fn finite_amount_rejects_overflow() {
        assert_eq!(require_finite_amount(1e300, "total"), Ok(1e300));
        assert_eq!(
            require_finite_amount(1e200 * 1e200, "total"),
            Err(EngineError::Validation("total is out of range".to_string()))
        );
    }

    #[test]
    fn positive_rejects_zero_negative_and_nan() {
        assert!(require_positive(0.5, "quantity").is_ok());
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                require_positive(value, "quantity"),
                Err(EngineError::Validation("quantity must be > 0".to_string()))
            );
        }
    }
}
