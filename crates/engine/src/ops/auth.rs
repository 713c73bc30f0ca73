//! Credentials and sessions.
//!
//! Sessions are looked up in the store on every call, there is no cache. A
//! session's expiry is fixed at creation: validation never extends it, and
//! expired rows stay in the table until [`Engine::purge_expired_sessions`]
//! removes them.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::{ActiveValue, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, sessions, users};

use super::{Engine, Role, normalize_required_text};

/// The user a successful login resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
}

/// A freshly issued bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// What a valid session token resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Engine {
    /// Provision a user. The email must be unused.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &Role,
    ) -> ResultEngine<String> {
        let name = normalize_required_text(name, "name")?;
        let email = normalize_required_text(email, "email")?;
        if password.is_empty() {
            return Err(EngineError::Validation("password is required".to_string()));
        }

        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;
        let id = Uuid::new_v4().to_string();
        let user = users::ActiveModel {
            id: ActiveValue::Set(id.clone()),
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            password_hash: ActiveValue::Set(password_hash),
            role: ActiveValue::Set(role.as_str().to_string()),
        };
        users::Entity::insert(user).exec(&self.database).await?;

        tracing::info!("created user {id}");
        Ok(id)
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password both fail with
    /// [`EngineError::InvalidCredentials`], after the same amount of hashing.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> ResultEngine<AuthenticatedUser> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .one(&self.database)
            .await?;

        let Some(user) = user else {
            // Result ignored: only the time spent matters here.
            let _ = bcrypt::verify(password, &self.dummy_hash);
            return Err(EngineError::InvalidCredentials);
        };

        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => Ok(AuthenticatedUser {
                id: user.id,
                name: user.name,
            }),
            Ok(false) => Err(EngineError::InvalidCredentials),
            Err(err) => {
                tracing::warn!("unreadable password hash for user {}: {err}", user.id);
                Err(EngineError::InvalidCredentials)
            }
        }
    }

    /// Issue a session valid for `ttl_days` from now.
    pub async fn create_session(&self, user_id: &str, ttl_days: i64) -> ResultEngine<Session> {
        self.create_session_at(user_id, ttl_days, Utc::now()).await
    }

    /// Same as [`Engine::create_session`] with an explicit clock.
    pub async fn create_session_at(
        &self,
        user_id: &str,
        ttl_days: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Session> {
        let invalid_ttl = || EngineError::Validation("session ttl must be > 0 days".to_string());
        if ttl_days <= 0 {
            return Err(invalid_ttl());
        }
        let ttl = TimeDelta::try_days(ttl_days).ok_or_else(invalid_ttl)?;
        // Whole seconds keep the stored text fixed width, so SQL comparisons
        // on `expires_at` order chronologically.
        let expires_at = now
            .trunc_subsecs(0)
            .checked_add_signed(ttl)
            .ok_or_else(invalid_ttl)?;

        let token = Uuid::new_v4().to_string();
        let session = sessions::ActiveModel {
            id: ActiveValue::Set(token.clone()),
            user_id: ActiveValue::Set(user_id.to_string()),
            expires_at: ActiveValue::Set(expires_at),
        };
        sessions::Entity::insert(session).exec(&self.database).await?;

        tracing::debug!("issued session for user {user_id} until {expires_at}");
        Ok(Session { token, expires_at })
    }

    /// Resolve a token into the identity of its owner.
    pub async fn validate_session(&self, token: &str) -> ResultEngine<SessionIdentity> {
        self.validate_session_at(token, Utc::now()).await
    }

    /// Same as [`Engine::validate_session`] with an explicit clock.
    pub async fn validate_session_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SessionIdentity> {
        let row = sessions::Entity::find_by_id(token.to_string())
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?;

        let Some((session, Some(user))) = row else {
            return Err(EngineError::Unauthorized);
        };
        if now > session.expires_at {
            return Err(EngineError::Unauthorized);
        }

        Ok(SessionIdentity {
            user_id: user.id,
            name: user.name,
            role: Role::from(user.role.as_str()),
            expires_at: session.expires_at,
        })
    }

    /// Delete a session. Unknown tokens are not an error.
    pub async fn destroy_session(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Delete every session that expired before `now`, returning how many.
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> ResultEngine<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lt(now.trunc_subsecs(0)))
            .exec(&self.database)
            .await?;

        tracing::info!("purged {} expired sessions", result.rows_affected);
        Ok(result.rows_affected)
    }
}
