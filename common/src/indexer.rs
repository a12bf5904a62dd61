use std::collections::BTreeSet;

use crate::app::MapReduceApp;
use crate::kv::KeyValue;
use crate::wordcount::normalize_token;

/// Índice invertido: palabra -> documentos donde aparece.
///
/// reduce devuelve `"<n> <doc1>,<doc2>,..."` con los documentos ordenados
/// y sin repetir.
#[derive(Debug, Clone, Copy, Default)]
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn map(&self, source: &str, contents: &str) -> Vec<KeyValue> {
        let words: BTreeSet<String> = contents
            .split_whitespace()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect();

        words
            .into_iter()
            .map(|w| KeyValue::new(w, source))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
        format!("{} {}", docs.len(), joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emits_each_word_once_per_document() {
        let kvs = Indexer.map("doc1", "a b a B");
        assert_eq!(
            kvs,
            vec![KeyValue::new("a", "doc1"), KeyValue::new("b", "doc1")]
        );
    }

    #[test]
    fn reduce_sorts_and_dedups_documents() {
        let values = vec!["doc2".to_string(), "doc1".to_string(), "doc2".to_string()];
        assert_eq!(Indexer.reduce("a", &values), "2 doc1,doc2");
    }
}
