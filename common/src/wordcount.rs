use tracing::warn;

use crate::app::MapReduceApp;
use crate::kv::KeyValue;

/// Splits text on whitespace, keeps alphanumerics and '_' and lowercases.
/// Tokens left empty are dropped.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().filter_map(|raw| {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect::<String>()
            .to_lowercase();
        (!cleaned.is_empty()).then_some(cleaned)
    })
}

/// Counts word occurrences: map emits `(word, "1")`, reduce sums.
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn map(&self, _file_name: &str, contents: &str) -> Vec<KeyValue> {
        tokenize(contents).map(|word| KeyValue::new(word, "1")).collect()
    }

    fn reduce(&self, key: &str, values: &[String]) -> String {
        let mut total: u64 = 0;
        for v in values {
            match v.trim().parse::<u64>() {
                Ok(n) => total += n,
                Err(_) => warn!("ignoring non-numeric count {:?} for {:?}", v, key),
            }
        }
        total.to_string()
    }
}
