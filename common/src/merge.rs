use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::error::{ExecError, ExecResult};
use crate::kv::KeyValueReader;
use crate::naming::{merge_name, reduce_name, result_name};
use crate::reduce::create_output;

/// Combines the outputs of all reduce tasks into `mrtmp.<job>`, one
/// `key: value` line per key in ascending key order.
pub fn merge_outputs(data_dir: &Path, job_name: &str, n_reduce: usize) -> ExecResult<PathBuf> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();

    for r in 0..n_reduce {
        let path = data_dir.join(merge_name(job_name, r));
        let file = File::open(&path).map_err(|source| ExecError::OpenResult {
            path: path.clone(),
            source,
        })?;

        for record in KeyValueReader::new(BufReader::new(file)) {
            match record.map_err(|source| ExecError::ReadPartition {
                path: path.clone(),
                source,
            })? {
                Ok(kv) => {
                    merged.insert(kv.key, kv.value);
                }
                Err(bad) => warn!("skipping {} in {}", bad, path.display()),
            }
        }
    }

    let out_path = data_dir.join(result_name(job_name));
    let write_err = |source| ExecError::WriteOutput {
        path: out_path.clone(),
        source,
    };

    let mut writer = BufWriter::new(create_output(&out_path)?);
    for (key, value) in &merged {
        writeln!(writer, "{}: {}", key, value).map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;

    info!(
        job = job_name,
        keys = merged.len(),
        "merged {} reduce outputs into {}",
        n_reduce,
        out_path.display()
    );
    Ok(out_path)
}

/// Removes the partition files and per-reduce outputs of a finished job.
/// Files that are already gone are ignored.
pub fn cleanup_intermediate(data_dir: &Path, job_name: &str, n_map: usize, n_reduce: usize) {
    let partitions = (0..n_map)
        .flat_map(|m| (0..n_reduce).map(move |r| reduce_name(job_name, m, r)));
    let outputs = (0..n_reduce).map(|r| merge_name(job_name, r));

    for name in partitions.chain(outputs) {
        let path = data_dir.join(name);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("could not remove {}: {}", path.display(), e);
            }
        }
    }
}
