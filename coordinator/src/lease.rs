use tokio::time::sleep;
use tracing::debug;

use crate::ledger::Lease;
use crate::state::AppState;

/// Programa el vencimiento de un lease: pasado el timeout, si la tarea sigue
/// en progreso con la misma época vuelve a quedar libre.
///
/// No hay cancelación. Si la tarea se completa antes, el timer dispara igual
/// y no hace nada; si se reasignó, la época nueva lo deja sin efecto.
pub fn spawn_expiry(state: AppState, lease: Lease) {
    tokio::spawn(async move {
        sleep(state.lease_timeout()).await;

        if !state.expire(lease) {
            debug!(
                "lease de {:?} {} (época {}) vencido sin efecto",
                lease.phase, lease.index, lease.epoch
            );
        }
    });
}
