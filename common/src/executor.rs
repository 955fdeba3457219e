use std::path::Path;

use tracing::info;

use crate::app::MapReduceApp;
use crate::error::{ExecError, ExecResult};
use crate::map::do_map;
use crate::naming::merge_name;
use crate::reduce::do_reduce;
use crate::task::{Phase, TaskDescriptor};

/// Runs one task descriptor against `app`, reading and writing under `data_dir`.
///
/// This is the body of `Worker.DoTask`. It never exits the process: every
/// failure comes back as an `ExecError` and the caller reports it.
pub fn execute_task(data_dir: &Path, app: &dyn MapReduceApp, task: &TaskDescriptor) -> ExecResult<()> {
    match task.phase {
        Phase::Map => {
            let input = task.input_file.as_deref().ok_or_else(|| {
                ExecError::invalid_task(format!(
                    "map task {} of job {} has no input file",
                    task.task_index, task.job_name
                ))
            })?;

            let emitted = do_map(
                data_dir,
                &task.job_name,
                task.task_index,
                Path::new(input),
                task.num_other_phase,
                |file, contents| app.map(file, contents),
            )?;
            info!(
                job = %task.job_name,
                task = task.task_index,
                "map task done ({} records from {})",
                emitted,
                input
            );
        }
        Phase::Reduce => {
            let out = data_dir.join(merge_name(&task.job_name, task.task_index));
            let keys = do_reduce(
                data_dir,
                &task.job_name,
                task.task_index,
                &out,
                task.num_other_phase,
                |key, values| app.reduce(key, values),
            )?;
            info!(
                job = %task.job_name,
                task = task.task_index,
                "reduce task done ({} keys)",
                keys
            );
        }
    }
    Ok(())
}
