use common::{config::DEFAULT_WAIT_BACKOFF, IntermediateStore, MapReduceApp, TaskAssignment};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::executor::{run_map_task, run_reduce_task, TaskError};
use crate::rpc::CoordinatorClient;

/// Qué hizo un worker antes de salir del loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub maps_run: usize,
    pub reduces_run: usize,
    pub waits: usize,
    /// `true` si salió por DONE, `false` si fue porque el coordinator
    /// dejó de responder.
    pub saw_done: bool,
}

pub struct Worker {
    name: String,
    client: CoordinatorClient,
    app: Arc<dyn MapReduceApp>,
    store: IntermediateStore,
    wait_backoff: Duration,
}

impl Worker {
    pub fn new(client: CoordinatorClient, app: Arc<dyn MapReduceApp>, store: IntermediateStore) -> Self {
        Self {
            name: format!("worker-{}", std::process::id()),
            client,
            app,
            store,
            wait_backoff: DEFAULT_WAIT_BACKOFF,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_wait_backoff(mut self, backoff: Duration) -> Self {
        self.wait_backoff = backoff;
        self
    }

    /// Loop principal del worker.
    /// - Pide una tarea.
    /// - MAP / REDUCE: la ejecuta, escribe en el store y reporta.
    /// - WAIT: duerme `wait_backoff` y vuelve a pedir.
    /// - DONE o coordinator inalcanzable: sale.
    ///
    /// Un error local de I/O corta el loop con `Err`: no se reporta nada y
    /// el lease del coordinator se encarga de reasignar la tarea.
    pub async fn run(&self) -> Result<WorkerSummary, TaskError> {
        let mut summary = WorkerSummary::default();

        loop {
            let assignment = match self.client.request_task().await {
                Ok(a) => a,
                Err(e) => {
                    warn!("{}: {}; no queda nada por hacer", self.name, e);
                    break;
                }
            };

            match assignment {
                TaskAssignment::Done => {
                    info!("{}: job terminado", self.name);
                    summary.saw_done = true;
                    break;
                }
                TaskAssignment::Wait => {
                    summary.waits += 1;
                    sleep(self.wait_backoff).await;
                }
                TaskAssignment::Map {
                    input_file,
                    map_index,
                    n_reduce,
                    epoch,
                } => {
                    info!("{}: tengo map {} ({})", self.name, map_index, input_file);

                    let app = Arc::clone(&self.app);
                    let store = self.store.clone();
                    tokio::task::spawn_blocking(move || {
                        run_map_task(app.as_ref(), &store, &input_file, map_index, n_reduce)
                    })
                    .await??;
                    summary.maps_run += 1;

                    // best-effort: si falla, el loop sigue igual
                    if let Err(e) = self.client.report_map_complete(map_index, epoch).await {
                        warn!("{}: no se pudo reportar map {}: {}", self.name, map_index, e);
                    }
                }
                TaskAssignment::Reduce {
                    reduce_index,
                    n_map,
                    epoch,
                } => {
                    info!("{}: tengo reduce {} ({} maps)", self.name, reduce_index, n_map);

                    let app = Arc::clone(&self.app);
                    let store = self.store.clone();
                    tokio::task::spawn_blocking(move || {
                        run_reduce_task(app.as_ref(), &store, reduce_index, n_map)
                    })
                    .await??;
                    summary.reduces_run += 1;

                    if let Err(e) = self.client.report_reduce_complete(reduce_index, epoch).await {
                        warn!("{}: no se pudo reportar reduce {}: {}", self.name, reduce_index, e);
                    }
                }
            }
        }

        Ok(summary)
    }
}
