use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{records, roster, settlements};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Actor identity attached to every request.
///
/// The login flow is a stub: the Basic auth username (an email) is taken
/// as the identity and the password is ignored. Real credential checking
/// is deliberately out of scope.
#[derive(Clone, Debug)]
pub struct Actor(pub String);

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request
        .extensions_mut()
        .insert(Actor(auth_header.username().to_string()));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/records", get(records::list).post(records::add))
        .route("/records/export", get(records::export))
        .route(
            "/settlements",
            get(settlements::list).post(settlements::settle),
        )
        .route("/settlements/{id}/records", get(settlements::details))
        .route("/settlements/{id}/export", get(settlements::export))
        .route("/roster", get(roster::get).put(roster::save))
        .route_layer(middleware::from_fn(auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
