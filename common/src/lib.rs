pub mod app;
pub mod error;
pub mod executor;
pub mod inverted_index;
pub mod job;
pub mod kv;
pub mod map;
pub mod merge;
pub mod naming;
pub mod reduce;
pub mod results;
pub mod task;
pub mod wordcount;
pub mod worker;

pub use app::{app_by_name, MapReduceApp};
pub use error::{ExecError, ExecResult};
pub use executor::execute_task;
pub use job::{JobId, JobInfo, JobRequest, JobStatus};
pub use kv::KeyValue;
pub use results::JobResults;
pub use task::{Phase, TaskDescriptor};
pub use worker::{
    DoTaskReply, WorkerId, WorkerInfo, WorkerRegisterRequest, WorkerRegisterResponse, DO_TASK,
};
