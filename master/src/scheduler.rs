// master/src/scheduler.rs

use mr_common::{Phase, TaskDescriptor};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::registry::WorkerFeed;
use crate::rpc::WorkerClient;
use crate::task_queue::{CompletionTracker, TaskQueue};

/// Runs every task of one phase and returns once each has been acknowledged
/// by exactly one successful `Worker.DoTask` call.
///
/// Map phase: one task per file in `map_files`, each writing `n_reduce`
/// partitions. Reduce phase: `n_reduce` tasks, each reading `map_files.len()`
/// partitions.
///
/// A worker that fails a call gets its task put back on the queue and is not
/// used again by this call. Tasks are retried without limit, so this only
/// returns once some worker has succeeded on each of them.
pub async fn schedule(
    job_name: &str,
    map_files: &[String],
    n_reduce: usize,
    phase: Phase,
    feed: WorkerFeed,
    client: Arc<dyn WorkerClient>,
) {
    let tasks = build_tasks(job_name, map_files, n_reduce, phase);
    let ntasks = tasks.len();
    let n_other = match phase {
        Phase::Map => n_reduce,
        Phase::Reduce => map_files.len(),
    };
    info!(job = job_name, %phase, "schedule: {} tasks ({} I/Os)", ntasks, n_other);

    let queue = Arc::new(TaskQueue::new());
    for task in tasks {
        queue.push(task);
    }
    let tracker = Arc::new(CompletionTracker::new());

    let consumer = tokio::spawn(consume_feed(feed, queue.clone(), tracker.clone(), client));

    tracker.wait_for(ntasks).await;
    queue.close();
    // also stops the dispatch loops, which are idle by now
    consumer.abort();

    info!(job = job_name, %phase, "schedule: done");
}

/// Descriptors `0..ntasks` of a phase, each carrying the other phase's count.
pub fn build_tasks(
    job_name: &str,
    map_files: &[String],
    n_reduce: usize,
    phase: Phase,
) -> Vec<TaskDescriptor> {
    match phase {
        Phase::Map => map_files
            .iter()
            .enumerate()
            .map(|(i, file)| TaskDescriptor::map(job_name, i, file, n_reduce))
            .collect(),
        Phase::Reduce => (0..n_reduce)
            .map(|i| TaskDescriptor::reduce(job_name, i, map_files.len()))
            .collect(),
    }
}

/// One dispatch loop per worker address the feed delivers.
async fn consume_feed(
    mut feed: WorkerFeed,
    queue: Arc<TaskQueue>,
    tracker: Arc<CompletionTracker>,
    client: Arc<dyn WorkerClient>,
) {
    let mut loops = JoinSet::new();

    while let Some(worker) = feed.next().await {
        debug!(%worker, "starting dispatch loop");
        loops.spawn(dispatch_loop(
            worker,
            queue.clone(),
            tracker.clone(),
            client.clone(),
        ));

        // reap loops that already ended
        while loops.try_join_next().is_some() {}
    }
}

async fn dispatch_loop(
    worker: String,
    queue: Arc<TaskQueue>,
    tracker: Arc<CompletionTracker>,
    client: Arc<dyn WorkerClient>,
) {
    while let Some(task) = queue.pop().await {
        if client.do_task(&worker, &task).await {
            let done = tracker.record_success();
            debug!(%worker, phase = %task.phase, task = task.task_index, done, "task completed");
        } else {
            let (phase, index) = (task.phase, task.task_index);
            queue.push(task);
            warn!(
                %worker,
                %phase,
                task = index,
                pending = queue.len(),
                "task failed, requeued it and dropping the worker"
            );
            return;
        }
    }
    debug!(%worker, "task queue closed");
}
