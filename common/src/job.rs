use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    Map,
    Reduce,
    Done,
}

/// Foto del avance del job, devuelta por `GET /api/v1/job`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub phase: JobPhase,

    pub n_map: usize,
    pub n_reduce: usize,
    pub completed_map: usize,
    pub completed_reduce: usize,

    /// Tareas entregadas y todavía sin reportar, por fase
    pub in_progress_map: usize,
    pub in_progress_reduce: usize,

    /// Cuántas veces venció un lease y la tarea volvió a quedar libre
    pub lease_expirations: u64,
    /// Reportes ignorados (duplicados o índice fuera de rango)
    pub ignored_reports: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobProgress {
    pub fn is_done(&self) -> bool {
        matches!(self.phase, JobPhase::Done)
    }
}
