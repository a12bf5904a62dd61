use serde::{Deserialize, Serialize};

/// Época de una asignación. Cada vez que el coordinator entrega una tarea
/// le pone una época nueva; el lease que la acompaña sólo vale para esa época.
pub type Epoch = u64;

/// Respuesta a `POST /api/v1/tasks/next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskAssignment {
    Map {
        input_file: String,
        map_index: usize,
        n_reduce: usize,
        epoch: Epoch,
    },
    Reduce {
        reduce_index: usize,
        n_map: usize,
        epoch: Epoch,
    },
    /// No hay nada libre en la fase actual; volver a preguntar más tarde.
    Wait,
    /// El job terminó.
    Done,
}

/// Cuerpo de los reportes de fin de tarea (map y reduce).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub task_index: usize,
    /// Época recibida en la asignación. Opcional para clientes viejos.
    #[serde(default)]
    pub epoch: Option<Epoch>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAck {
    /// `false` si el reporte era duplicado o el índice no existe.
    pub accepted: bool,
}
