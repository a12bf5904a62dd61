pub mod app;
pub mod config;
pub mod indexer;
pub mod job;
pub mod kv;
pub mod store;
pub mod task;
pub mod wordcount;

pub use app::{app_by_name, MapReduceApp, APP_NAMES};
pub use job::{JobPhase, JobProgress};
pub use kv::{partition_for, KeyValue};
pub use store::IntermediateStore;
pub use task::{Epoch, ReportAck, TaskAssignment, TaskReport};

/// Rutas HTTP del coordinator. Las comparten el worker y el cliente.
pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const NEXT_TASK: &str = "/api/v1/tasks/next";
    pub const MAP_COMPLETE: &str = "/api/v1/tasks/map/complete";
    pub const REDUCE_COMPLETE: &str = "/api/v1/tasks/reduce/complete";
    pub const JOB: &str = "/api/v1/job";
}
