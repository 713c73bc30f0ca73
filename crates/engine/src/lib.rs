//! Purchasing ledger engine.
//!
//! The [`Engine`] owns the database handle and exposes every operation the
//! server needs: credential checks and sessions, the admin gate, catalog
//! lookups, and the expense ledger with its monthly budgets.

pub use dates::{CalendarDay, Month};
pub use error::EngineError;
pub use money::round2;
pub use ops::{
    AuthenticatedUser, Caller, Category, CategoryTotal, Engine, EngineBuilder, ExpenseCreated,
    ExpenseRow, Item, MonthlySummary, Role, SeedReport, Session, SessionIdentity,
};

mod categories;
mod dates;
mod error;
mod expenses;
mod items;
mod money;
mod monthly_budgets;
mod ops;
mod sessions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
