use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{SESSION_COOKIE, ServerConfig, app, run_with_listener, spawn_with_listener};

mod auth;
mod budget;
mod catalog;
mod expenses;
mod server;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidCredentials | EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::Constraint(_) | EngineError::Hashing(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Validation(msg) => msg,
        EngineError::InvalidCredentials => "invalid credentials".to_string(),
        EngineError::Unauthorized => "unauthorized".to_string(),
        EngineError::Constraint(msg) => {
            tracing::warn!("write rejected by the store: {msg}");
            "failed to write record".to_string()
        }
        EngineError::Hashing(err) => {
            tracing::error!("password hashing error: {err}");
            "internal server error".to_string()
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_auth_failures_map_to_401() {
        let res = ServerError::from(EngineError::InvalidCredentials).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_constraint_maps_to_500() {
        let res = ServerError::from(EngineError::Constraint("FOREIGN KEY".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn constraint_details_are_not_leaked() {
        let message = message_for_engine_error(EngineError::Constraint(
            "UNIQUE constraint failed: users.email".to_string(),
        ));
        assert_eq!(message, "failed to write record");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
