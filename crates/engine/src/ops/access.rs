use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine};

use super::Engine;

const ADMIN_ROLE: &str = "admin";

/// Authorization tier of a user. Only `admin` is granted anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Other(String),
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns the role string stored in the database.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => ADMIN_ROLE,
            Self::Other(role) => role,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            ADMIN_ROLE => Self::Admin,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Identity of a caller that passed the admin gate.
///
/// Handlers pass `user_id` on to ledger writes that stamp a creator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub name: String,
}

impl Engine {
    /// Admin gate: resolve a raw session token into a [`Caller`].
    ///
    /// A missing or blank token, an unknown or expired session, and a non
    /// admin user all fail with [`EngineError::Unauthorized`]. Storage
    /// failures are returned as they are.
    pub async fn authorize_admin(&self, token: Option<&str>) -> ResultEngine<Caller> {
        self.authorize_admin_at(token, Utc::now()).await
    }

    /// Same as [`Engine::authorize_admin`] with an explicit clock.
    pub async fn authorize_admin_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<Caller> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(EngineError::Unauthorized)?;

        let identity = self.validate_session_at(token, now).await?;
        if !identity.role.is_admin() {
            tracing::debug!("rejecting non admin user {}", identity.user_id);
            return Err(EngineError::Unauthorized);
        }

        Ok(Caller {
            user_id: identity.user_id,
            name: identity.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_string_is_admin() {
        assert!(Role::from("admin").is_admin());
        assert!(!Role::from("Admin").is_admin());
        assert!(!Role::from("staff").is_admin());
        assert_eq!(Role::from("staff").as_str(), "staff");
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
