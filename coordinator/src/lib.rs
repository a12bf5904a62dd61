pub mod handlers;
pub mod lease;
pub mod ledger;
pub mod state;

use std::{future::Future, time::Duration};

use tokio::net::TcpListener;
use tracing::info;

pub use handlers::build_router;
pub use ledger::{Lease, Phase, ReportOutcome, TaskLedger, TaskStatus};
pub use state::AppState;

/// Cada cuánto se pregunta `is_done()` para apagar el servidor.
pub const DEFAULT_DONE_POLL: Duration = Duration::from_secs(1);

/// Resuelve cuando el job terminó.
pub async fn wait_until_done(state: AppState, poll: Duration) {
    while !state.is_done() {
        tokio::time::sleep(poll).await;
    }
}

/// Sirve la API sobre `listener` hasta que `shutdown` resuelva.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    info!("coordinator escuchando en {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Sirve hasta que el job termina.
pub async fn serve_until_done(
    listener: TcpListener,
    state: AppState,
    poll: Duration,
) -> std::io::Result<()> {
    let done = wait_until_done(state.clone(), poll);
    serve(listener, state, done).await?;
    info!("job terminado, coordinator apagado");
    Ok(())
}
