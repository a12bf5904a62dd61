// coordinator/src/state.rs

use common::{Epoch, JobProgress, TaskAssignment};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tracing::{info, warn};

use crate::lease;
use crate::ledger::{Lease, Phase, ReportOutcome, TaskLedger};

/// Estado compartido del coordinator. Se clona barato (todo va en `Arc`)
/// y cada handler HTTP recibe su copia.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Mutex<TaskLedger>>,
    lease_timeout: Duration,
}

impl AppState {
    pub fn new(files: Vec<String>, n_reduce: usize, lease_timeout: Duration) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(TaskLedger::new(files, n_reduce))),
            lease_timeout,
        }
    }

    pub fn lease_timeout(&self) -> Duration {
        self.lease_timeout
    }

    /// Un panic con el lock tomado no deja el ledger a medias (cada
    /// operación lo muta al final), así que seguimos usándolo.
    fn ledger(&self) -> MutexGuard<'_, TaskLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// RequestTask: elige y marca la tarea bajo el lock, lo suelta y recién
    /// ahí programa el vencimiento del lease.
    ///
    /// Tiene que correr dentro de un runtime de tokio.
    pub fn request_task(&self) -> TaskAssignment {
        let (assignment, lease) = self.ledger().assign();

        if let Some(lease) = lease {
            info!(
                "asignando {:?} {} (época {}), lease de {:?}",
                lease.phase, lease.index, lease.epoch, self.lease_timeout
            );
            lease::spawn_expiry(self.clone(), lease);
        }

        assignment
    }

    pub fn report_map_complete(&self, task_index: usize, epoch: Option<Epoch>) -> ReportOutcome {
        self.report(Phase::Map, task_index, epoch)
    }

    pub fn report_reduce_complete(&self, task_index: usize, epoch: Option<Epoch>) -> ReportOutcome {
        self.report(Phase::Reduce, task_index, epoch)
    }

    fn report(&self, phase: Phase, task_index: usize, epoch: Option<Epoch>) -> ReportOutcome {
        let outcome = self.ledger().complete(phase, task_index, epoch);
        match outcome {
            ReportOutcome::Counted => info!("{:?} {} completada", phase, task_index),
            ReportOutcome::Duplicate => {
                info!("{:?} {} ya estaba completada, reporte ignorado", phase, task_index)
            }
            ReportOutcome::Unknown => {
                warn!("reporte de {:?} {} fuera de rango, ignorado", phase, task_index)
            }
            ReportOutcome::NotAssigned => {
                warn!("reporte de {:?} {} sin asignación vigente, ignorado", phase, task_index)
            }
        }
        outcome
    }

    /// Lo llama el timer del lease cuando vence.
    pub(crate) fn expire(&self, lease: Lease) -> bool {
        let expired = self.ledger().expire(lease);
        if expired {
            warn!(
                "lease vencido para {:?} {} (época {}), la tarea vuelve a estar libre",
                lease.phase, lease.index, lease.epoch
            );
        }
        expired
    }

    pub fn is_done(&self) -> bool {
        self.ledger().is_done()
    }

    pub fn progress(&self) -> JobProgress {
        self.ledger().progress()
    }
}
