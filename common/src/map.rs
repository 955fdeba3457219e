use std::{
    fs,
    hash::Hasher,
    path::Path,
};

use fnv::FnvHasher;
use tracing::debug;

use crate::error::{ExecError, ExecResult};
use crate::kv::{KeyValue, KeyValueWriter};
use crate::naming::reduce_name;
use crate::reduce::create_output;

/// Reduce partition a key belongs to. Stable across processes and builds,
/// since every map task must route a given key to the same reduce task.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    let mut hasher = FnvHasher::default();
    hasher.write(key.as_bytes());
    ((hasher.finish() & 0x7fff_ffff) % n_reduce as u64) as usize
}

/// Runs one map task: reads `in_file`, applies `map_f(file_name, contents)` and
/// writes its records into `n_reduce` partition files, one per reduce task.
/// Every partition file is created, even when empty, so reducers can rely on
/// all of them existing.
///
/// Returns the number of records emitted.
pub fn do_map<F>(
    data_dir: &Path,
    job_name: &str,
    map_task: usize,
    in_file: &Path,
    n_reduce: usize,
    map_f: F,
) -> ExecResult<usize>
where
    F: FnOnce(&str, &str) -> Vec<KeyValue>,
{
    if n_reduce == 0 {
        return Err(ExecError::invalid_task(format!(
            "map task {} of job {} has no reduce partitions",
            map_task, job_name
        )));
    }

    let contents = fs::read_to_string(in_file).map_err(|source| ExecError::ReadInput {
        path: in_file.to_path_buf(),
        source,
    })?;
    let file_name = in_file.to_string_lossy();
    let records = map_f(file_name.as_ref(), &contents);

    let paths: Vec<_> = (0..n_reduce)
        .map(|r| data_dir.join(reduce_name(job_name, map_task, r)))
        .collect();
    let mut writers = Vec::with_capacity(n_reduce);
    for path in &paths {
        writers.push(KeyValueWriter::new(create_output(path)?));
    }

    for kv in &records {
        let r = partition_for(&kv.key, n_reduce);
        writers[r].write(kv).map_err(|source| ExecError::WriteOutput {
            path: paths[r].clone(),
            source,
        })?;
    }

    for (writer, path) in writers.into_iter().zip(&paths) {
        writer.finish().map_err(|source| ExecError::WriteOutput {
            path: path.clone(),
            source,
        })?;
    }

    debug!(
        job = job_name,
        map_task,
        n_reduce,
        records = records.len(),
        "map partitions written for {}",
        in_file.display()
    );
    Ok(records.len())
}
