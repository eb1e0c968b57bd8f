use checklist_calendar::{
    auth::Authenticator,
    remote::{Backend, FileRecordStore, RestRecordStore},
    router, AppConfig, AppState,
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env()?;

    let (store, auth) = match &config.supabase {
        Some(supabase) => {
            info!(url = %supabase.url, "using Supabase backend");
            (
                Backend::Rest(RestRecordStore::new(supabase)),
                Authenticator::supabase(supabase.clone()),
            )
        }
        None => {
            let store = FileRecordStore::open(&config.data_path).await?;
            info!(path = %store.path().display(), "using local record store");
            if config.users.is_empty() {
                warn!("APP_USERS is empty; nobody can sign in");
            }
            (Backend::File(store), Authenticator::local(config.users.clone()))
        }
    };

    let state = AppState::new(store, auth);
    let watcher = state.spawn_session_watcher();
    let app = router(state.clone());

    let addr = SocketAddr::new(config.host, config.port);
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.sessions.sign_out();
    drop(state);
    watcher.abort();
    info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
