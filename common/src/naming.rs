//! File names shared by the map writers, the reduce readers and the merger.
//! All of them are relative to the job's data directory.

/// Partition written by map task `map_task` for reduce task `reduce_task`.
pub fn reduce_name(job_name: &str, map_task: usize, reduce_task: usize) -> String {
    format!("mrtmp.{}-{}-{}", job_name, map_task, reduce_task)
}

/// Output of reduce task `reduce_task`.
pub fn merge_name(job_name: &str, reduce_task: usize) -> String {
    format!("{}{}", merge_prefix(job_name), reduce_task)
}

/// Common prefix of every reduce output of a job.
pub fn merge_prefix(job_name: &str) -> String {
    format!("mrtmp.{}-res-", job_name)
}

/// Final merged output of the job.
pub fn result_name(job_name: &str) -> String {
    format!("mrtmp.{}", job_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deterministic_and_distinct() {
        assert_eq!(reduce_name("wc", 3, 1), "mrtmp.wc-3-1");
        assert_eq!(reduce_name("wc", 3, 1), reduce_name("wc", 3, 1));
        assert_ne!(reduce_name("wc", 1, 3), reduce_name("wc", 3, 1));
        assert_eq!(merge_name("wc", 2), "mrtmp.wc-res-2");
        assert!(merge_name("wc", 12).starts_with(&merge_prefix("wc")));
        assert_eq!(result_name("wc"), "mrtmp.wc");
    }
}
