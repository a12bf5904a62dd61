// coordinator/src/ledger.rs

use chrono::{DateTime, Utc};
use common::{Epoch, JobPhase, JobProgress, TaskAssignment};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Untouched,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub status: TaskStatus,
    /// Época de la última asignación (0 = nunca asignada)
    pub epoch: Epoch,
}

impl TaskRecord {
    fn untouched() -> Self {
        Self {
            status: TaskStatus::Untouched,
            epoch: 0,
        }
    }
}

/// Lease de una asignación: qué tarea y con qué época se entregó.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    pub phase: Phase,
    pub index: usize,
    pub epoch: Epoch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Primera vez que se completa: se contó.
    Counted,
    /// La tarea ya estaba completada.
    Duplicate,
    /// Índice fuera de rango.
    Unknown,
    /// La tarea nunca se entregó, o es un reduce y los maps no terminaron.
    NotAssigned,
}

/// Estado completo del job. No sabe nada de locks ni de timers: el
/// coordinator lo guarda detrás de un único `Mutex` y cada operación de
/// acá corre entera dentro de ese lock.
#[derive(Debug)]
pub struct TaskLedger {
    files: Vec<String>,
    n_reduce: usize,

    map_tasks: Vec<TaskRecord>,
    reduce_tasks: Vec<TaskRecord>,
    completed_map: usize,
    completed_reduce: usize,

    next_epoch: Epoch,

    // Métricas
    lease_expirations: u64,
    ignored_reports: u64,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl TaskLedger {
    pub fn new(files: Vec<String>, n_reduce: usize) -> Self {
        let n_map = files.len();
        let mut ledger = Self {
            files,
            n_reduce,
            map_tasks: vec![TaskRecord::untouched(); n_map],
            reduce_tasks: vec![TaskRecord::untouched(); n_reduce],
            completed_map: 0,
            completed_reduce: 0,
            next_epoch: 1,
            lease_expirations: 0,
            ignored_reports: 0,
            started_at: Utc::now(),
            finished_at: None,
        };
        // job vacío (n_reduce = 0): ya está terminado
        ledger.mark_finished_if_done();
        ledger
    }

    pub fn n_map(&self) -> usize {
        self.files.len()
    }

    pub fn n_reduce(&self) -> usize {
        self.n_reduce
    }

    pub fn completed(&self, phase: Phase) -> usize {
        match phase {
            Phase::Map => self.completed_map,
            Phase::Reduce => self.completed_reduce,
        }
    }

    pub fn status(&self, phase: Phase, index: usize) -> Option<TaskStatus> {
        self.tasks(phase).get(index).map(|t| t.status)
    }

    pub fn is_done(&self) -> bool {
        self.completed_reduce == self.n_reduce
    }

    /// Entrega la siguiente tarea libre, si la hay.
    ///
    /// Mientras queden maps sin completar sólo se miran los maps; los reduces
    /// no se tocan hasta que `completed_map == n_map`. Dentro de la fase se
    /// toma siempre el índice libre más bajo.
    pub fn assign(&mut self) -> (TaskAssignment, Option<Lease>) {
        let phase = if self.completed_map < self.n_map() {
            Phase::Map
        } else if self.completed_reduce < self.n_reduce {
            Phase::Reduce
        } else {
            return (TaskAssignment::Done, None);
        };

        let Some(index) = self
            .tasks(phase)
            .iter()
            .position(|t| t.status == TaskStatus::Untouched)
        else {
            return (TaskAssignment::Wait, None);
        };

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let record = &mut self.tasks_mut(phase)[index];
        record.status = TaskStatus::InProgress;
        record.epoch = epoch;

        let assignment = match phase {
            Phase::Map => TaskAssignment::Map {
                input_file: self.files[index].clone(),
                map_index: index,
                n_reduce: self.n_reduce,
                epoch,
            },
            Phase::Reduce => TaskAssignment::Reduce {
                reduce_index: index,
                n_map: self.n_map(),
                epoch,
            },
        };

        (assignment, Some(Lease { phase, index, epoch }))
    }

    /// Vence un lease. Sólo libera la tarea si sigue en progreso con la
    /// misma época; si ya se completó o se volvió a asignar, no hace nada.
    pub fn expire(&mut self, lease: Lease) -> bool {
        let Some(record) = self.tasks_mut(lease.phase).get_mut(lease.index) else {
            return false;
        };

        if record.status == TaskStatus::InProgress && record.epoch == lease.epoch {
            record.status = TaskStatus::Untouched;
            self.lease_expirations += 1;
            true
        } else {
            false
        }
    }

    /// Registra el fin de una tarea. Idempotente: un segundo reporte para la
    /// misma tarea no vuelve a contar.
    pub fn complete(&mut self, phase: Phase, index: usize, epoch: Option<Epoch>) -> ReportOutcome {
        // un reduce no puede terminar antes que los maps
        let gated = phase == Phase::Reduce && self.completed_map < self.n_map();

        let Some(record) = self.tasks_mut(phase).get_mut(index) else {
            self.ignored_reports += 1;
            return ReportOutcome::Unknown;
        };

        if record.status == TaskStatus::Completed {
            self.ignored_reports += 1;
            return ReportOutcome::Duplicate;
        }

        if record.epoch == 0 || gated {
            self.ignored_reports += 1;
            return ReportOutcome::NotAssigned;
        }

        if let Some(e) = epoch {
            if e != record.epoch {
                // worker lento cuyo lease ya venció: su salida es igual de
                // válida, así que se acepta igual
                debug!(
                    "reporte {:?} {} con época vieja {} (actual {})",
                    phase, index, e, record.epoch
                );
            }
        }

        record.status = TaskStatus::Completed;
        match phase {
            Phase::Map => self.completed_map += 1,
            Phase::Reduce => self.completed_reduce += 1,
        }

        if phase == Phase::Map && self.completed_map == self.n_map() {
            info!("fase map terminada ({} tareas), arrancan los reduce", self.n_map());
        }
        self.mark_finished_if_done();

        ReportOutcome::Counted
    }

    pub fn progress(&self) -> JobProgress {
        let phase = if self.completed_map < self.n_map() {
            JobPhase::Map
        } else if !self.is_done() {
            JobPhase::Reduce
        } else {
            JobPhase::Done
        };

        let in_progress = |tasks: &[TaskRecord]| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::InProgress)
                .count()
        };

        JobProgress {
            phase,
            n_map: self.n_map(),
            n_reduce: self.n_reduce,
            completed_map: self.completed_map,
            completed_reduce: self.completed_reduce,
            in_progress_map: in_progress(self.map_tasks.as_slice()),
            in_progress_reduce: in_progress(self.reduce_tasks.as_slice()),
            lease_expirations: self.lease_expirations,
            ignored_reports: self.ignored_reports,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    fn mark_finished_if_done(&mut self) {
        if self.is_done() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
            if self.n_reduce == 0 {
                warn!("job sin particiones de reduce: no hay nada que hacer");
            }
        }
    }

    fn tasks(&self, phase: Phase) -> &[TaskRecord] {
        match phase {
            Phase::Map => &self.map_tasks,
            Phase::Reduce => &self.reduce_tasks,
        }
    }

    fn tasks_mut(&mut self, phase: Phase) -> &mut [TaskRecord] {
        match phase {
            Phase::Map => &mut self.map_tasks,
            Phase::Reduce => &mut self.reduce_tasks,
        }
    }
}
