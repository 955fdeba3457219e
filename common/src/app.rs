use std::sync::Arc;

use crate::inverted_index::InvertedIndex;
use crate::kv::KeyValue;
use crate::wordcount::WordCount;

/// User code run by the workers: a map over one input file and a reduce over
/// the values of one key.
pub trait MapReduceApp: Send + Sync {
    fn map(&self, file_name: &str, contents: &str) -> Vec<KeyValue>;
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Applications a worker can be started with.
pub const APP_NAMES: &[&str] = &["wordcount", "invertedindex"];

pub fn app_by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wordcount" => Some(Arc::new(WordCount)),
        "invertedindex" => Some(Arc::new(InvertedIndex)),
        _ => None,
    }
}
