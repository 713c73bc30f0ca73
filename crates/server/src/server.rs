use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;

use std::sync::Arc;

use crate::{ServerError, auth, budget, catalog, expenses};
use engine::Engine;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "larder_session";

/// HTTP level knobs.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Lifetime of a session issued at login.
    pub session_ttl_days: i64,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 14,
            secure_cookies: false,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub config: ServerConfig,
}

/// Admin gate in front of every protected route.
///
/// The handler only runs once the session cookie resolved to an admin; the
/// resulting [`engine::Caller`] is put in the request extensions.
async fn require_admin(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());
    let caller = state.engine.authorize_admin(token).await?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

async fn health() -> &'static str {
    "ok"
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/categories", get(catalog::categories))
        .route("/items", get(catalog::items))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/budget", post(budget::set_budget))
        .route("/dashboard/summary", get(budget::summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

/// Build the application router around an engine.
pub fn app(engine: Engine, config: ServerConfig) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        config,
    })
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
