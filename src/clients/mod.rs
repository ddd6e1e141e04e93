pub mod parallel_client;
pub mod task_api;

pub use parallel_client::ParallelClient;
pub use task_api::{RunPoll, TaskApi, TaskRun, TaskRunResult};
