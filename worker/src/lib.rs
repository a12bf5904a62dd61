pub mod executor;
pub mod rpc;
pub mod worker;

pub use executor::{run_map_task, run_reduce_task, TaskError};
pub use rpc::{CallError, CoordinatorClient};
pub use worker::{Worker, WorkerSummary};
