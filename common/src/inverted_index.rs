use std::collections::BTreeSet;

use crate::app::MapReduceApp;
use crate::kv::KeyValue;
use crate::wordcount::tokenize;

/// For every word, the documents it appears in: `"<n> <doc1,doc2,...>"`.
pub struct InvertedIndex;

impl MapReduceApp for InvertedIndex {
    fn map(&self, file_name: &str, contents: &str) -> Vec<KeyValue> {
        let words: BTreeSet<String> = tokenize(contents).collect();
        words
            .into_iter()
            .map(|word| KeyValue::new(word, file_name))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined: Vec<&str> = docs.into_iter().collect();
        format!("{} {}", joined.len(), joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emits_each_word_once_per_document() {
        let out = InvertedIndex.map("doc1", "the cat and the hat");
        let keys: Vec<&str> = out.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["and", "cat", "hat", "the"]);
        assert!(out.iter().all(|kv| kv.value == "doc1"));
    }

    #[test]
    fn reduce_lists_sorted_unique_documents() {
        let values: Vec<String> = ["d2", "d1", "d2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(InvertedIndex.reduce("cat", &values), "2 d1,d2");
    }
}
