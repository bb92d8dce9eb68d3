use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{ServerError, auth, records};
use api_types::{expense::Expense, production::Production, sale::Sale};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the bearer token into a [`engine::Session`] request extension.
///
/// A missing header, an unknown token and an expired session are all `401`.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(EngineError::Unauthenticated.into());
    };
    if bearer.token().is_empty() {
        return Err(EngineError::Unauthenticated.into());
    }

    let session = state.engine.session(bearer.token()).await?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let protected = Router::new()
        .route("/auth/session", get(auth::session))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/signout", post(auth::sign_out))
        .route(
            "/production",
            get(records::list::<Production>).post(records::create::<Production>),
        )
        .route("/production/{id}", delete(records::remove::<Production>))
        .route(
            "/sales",
            get(records::list::<Sale>).post(records::create::<Sale>),
        )
        .route("/sales/{id}", delete(records::remove::<Sale>))
        .route(
            "/expenses",
            get(records::list::<Expense>).post(records::create::<Expense>),
        )
        .route("/expenses/{id}", delete(records::remove::<Expense>))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/auth/signin", post(auth::sign_in))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
