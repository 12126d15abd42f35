use axum::{
    Router,
    routing::{delete, get, post},
};

use std::sync::Arc;

use crate::{balances, expenses, groups, members, settlements, statistics};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/group", post(groups::create).get(groups::get))
        .route("/groups", get(groups::list_for_user))
        .route("/group/join", post(members::join))
        .route("/group/members", get(members::list))
        .route("/expense", post(expenses::create))
        .route("/expenses", get(expenses::list))
        .route("/expenses/{id}", delete(expenses::remove))
        .route("/balances", get(balances::list))
        .route("/settlement", get(settlements::plan))
        .route("/stats", get(statistics::get_stats))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
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

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
