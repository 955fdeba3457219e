use std::{
    collections::HashMap,
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use tracing::{debug, warn};

use crate::error::{ExecError, ExecResult};
use crate::kv::{KeyValue, KeyValueReader, KeyValueWriter};
use crate::naming::reduce_name;

/// Runs one reduce task.
///
/// 1. Reads partition `reduce_task` of every map task `0..n_map`, in map order,
///    grouping values by key. Within a key, values keep read order.
/// 2. Sorts the distinct keys by byte order.
/// 3. Calls `reduce_f(key, values)` once per key and writes `(key, result)`
///    to `out_file`, which is fully flushed before returning.
///
/// A malformed record is logged and skipped. A partition that cannot be opened
/// or read fails the whole task before any output is created.
///
/// Returns the number of records written.
pub fn do_reduce<F>(
    data_dir: &Path,
    job_name: &str,
    reduce_task: usize,
    out_file: &Path,
    n_map: usize,
    mut reduce_f: F,
) -> ExecResult<usize>
where
    F: FnMut(&str, &[String]) -> String,
{
    let groups = group_partitions(data_dir, job_name, reduce_task, n_map)?;

    let mut entries: Vec<(String, Vec<String>)> = groups.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let written = entries.len();

    let write_err = |source| ExecError::WriteOutput {
        path: out_file.to_path_buf(),
        source,
    };

    let mut writer = KeyValueWriter::new(create_output(out_file)?);
    for (key, values) in entries {
        let value = reduce_f(&key, &values);
        writer.write(&KeyValue { key, value }).map_err(write_err)?;
    }
    writer.finish().map_err(write_err)?;

    debug!(
        job = job_name,
        reduce_task,
        n_map,
        keys = written,
        "reduce output written to {}",
        out_file.display()
    );
    Ok(written)
}

fn group_partitions(
    data_dir: &Path,
    job_name: &str,
    reduce_task: usize,
    n_map: usize,
) -> ExecResult<HashMap<String, Vec<String>>> {
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();

    for map_task in 0..n_map {
        let path = data_dir.join(reduce_name(job_name, map_task, reduce_task));
        let file = File::open(&path).map_err(|source| ExecError::OpenPartition {
            path: path.clone(),
            source,
        })?;

        for record in KeyValueReader::new(BufReader::new(file)) {
            let record = record.map_err(|source| ExecError::ReadPartition {
                path: path.clone(),
                source,
            })?;

            match record {
                Ok(kv) => groups.entry(kv.key).or_default().push(kv.value),
                Err(bad) => warn!("skipping {} in {}", bad, path.display()),
            }
        }
    }

    Ok(groups)
}

/// Creates (truncating) an output file, making its parent directory if needed.
pub(crate) fn create_output(path: &Path) -> ExecResult<File> {
    let create_err = |source| ExecError::CreateOutput {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(create_err)?;
        }
    }
    File::create(path).map_err(create_err)
}
