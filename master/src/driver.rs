// master/src/driver.rs

use chrono::Utc;
use mr_common::{
    merge::{cleanup_intermediate, merge_outputs},
    JobId, JobStatus, Phase,
};
use tracing::{error, info};

use crate::scheduler::schedule;
use crate::state::AppState;

/// Runs a submitted job to the end: map phase, reduce phase, then the merge
/// of all reduce outputs. The job id doubles as the job name in file names.
pub async fn run_job(state: AppState, job_id: JobId) {
    let Some(job) = state.job(&job_id) else {
        error!("job {} vanished before it started", job_id);
        return;
    };
    let n_map = job.n_map();
    let n_reduce = job.n_reduce as usize;

    info!(job = %job_id, name = %job.name, n_map, n_reduce, "job started");
    state.update_job(&job_id, |j| {
        j.status = JobStatus::Running;
        j.started_at = Some(Utc::now());
    });

    for phase in [Phase::Map, Phase::Reduce] {
        state.update_job(&job_id, |j| j.phase = Some(phase));
        schedule(
            &job_id,
            &job.input_files,
            n_reduce,
            phase,
            state.registry.subscribe(),
            state.client.clone(),
        )
        .await;
    }

    let data_dir = state.config.data_dir.clone();
    let keep = state.config.keep_intermediate;
    let name = job_id.clone();
    let merged = tokio::task::spawn_blocking(move || {
        let out = merge_outputs(&data_dir, &name, n_reduce)?;
        if !keep {
            cleanup_intermediate(&data_dir, &name, n_map, n_reduce);
        }
        Ok::<_, mr_common::ExecError>(out)
    })
    .await;

    let outcome = match merged {
        Ok(Ok(path)) => Ok(path.to_string_lossy().to_string()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("merge task panicked: {}", e)),
    };

    match &outcome {
        Ok(path) => info!(job = %job_id, "job succeeded, output in {}", path),
        Err(e) => error!(job = %job_id, "job failed: {}", e),
    }

    state.update_job(&job_id, |j| {
        j.phase = None;
        j.finished_at = Some(Utc::now());
        match outcome {
            Ok(path) => {
                j.status = JobStatus::Succeeded;
                j.output_file = Some(path);
            }
            Err(e) => {
                j.status = JobStatus::Failed;
                j.error = Some(e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MasterConfig;
    use crate::testing::{temp_dir, LocalWorkerClient, ScriptedClient};
    use mr_common::{naming::merge_name, wordcount::WordCount, JobInfo};
    use std::{fs, path::Path, sync::Arc, time::Duration};
    use tokio::time::timeout;

    fn config(data_dir: &Path, keep_intermediate: bool) -> MasterConfig {
        MasterConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_path_buf(),
            rpc_timeout: Duration::from_secs(5),
            keep_intermediate,
        }
    }

    fn submit(state: &AppState, id: &str, inputs: Vec<String>, n_reduce: u32) {
        state.insert_job(JobInfo {
            id: id.to_string(),
            name: "wordcount".to_string(),
            status: JobStatus::Accepted,
            phase: None,
            input_files: inputs,
            n_reduce,
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            output_file: None,
            error: None,
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn wordcount_job_runs_to_a_merged_result() {
        let dir = temp_dir("driver_wordcount");
        let inputs: Vec<String> = [("a.txt", "the quick fox"), ("b.txt", "The lazy dog"), ("c.txt", "fox FOX")]
            .iter()
            .map(|(name, text)| {
                let path = dir.join(name);
                fs::write(&path, text).unwrap();
                path.to_string_lossy().to_string()
            })
            .collect();

        let client = LocalWorkerClient::new(dir.clone(), Arc::new(WordCount)).failing("flaky");
        let state = AppState::new(config(&dir, false), Arc::new(client));
        state.registry.register("flaky", "flaky");
        state.registry.register("steady", "steady");
        submit(&state, "job1", inputs, 3);

        timeout(Duration::from_secs(20), run_job(state.clone(), "job1".to_string()))
            .await
            .unwrap();

        let job = state.job("job1").unwrap();
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.phase.is_none());
        assert!(job.started_at.is_some() && job.finished_at.is_some());

        let output = fs::read_to_string(job.output_file.unwrap()).unwrap();
        assert_eq!(output, "dog: 1\nfox: 3\nlazy: 1\nquick: 1\nthe: 2\n");

        // intermediate files are gone, the merged result stays
        let left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("mrtmp."))
            .collect();
        assert_eq!(left, vec!["mrtmp.job1".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn keep_intermediate_leaves_reduce_outputs() {
        let dir = temp_dir("driver_keep");
        let input = dir.join("in.txt");
        fs::write(&input, "x y").unwrap();

        let client = LocalWorkerClient::new(dir.clone(), Arc::new(WordCount));
        let state = AppState::new(config(&dir, true), Arc::new(client));
        state.registry.register("w", "w");
        submit(&state, "job2", vec![input.to_string_lossy().to_string()], 2);

        timeout(Duration::from_secs(20), run_job(state.clone(), "job2".to_string()))
            .await
            .unwrap();

        assert_eq!(state.job("job2").unwrap().status, JobStatus::Succeeded);
        assert!(dir.join(merge_name("job2", 0)).exists());
        assert!(dir.join(merge_name("job2", 1)).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn missing_reduce_outputs_fail_the_job() {
        let dir = temp_dir("driver_fail");
        // acknowledges tasks without running them, so nothing is written
        let state = AppState::new(config(&dir, false), Arc::new(ScriptedClient::new()));
        state.registry.register("w", "w");
        submit(&state, "job3", vec!["/nowhere.txt".to_string()], 1);

        timeout(Duration::from_secs(20), run_job(state.clone(), "job3".to_string()))
            .await
            .unwrap();

        let job = state.job("job3").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("mrtmp.job3-res-0"));
        assert!(job.output_file.is_none());
    }
}
