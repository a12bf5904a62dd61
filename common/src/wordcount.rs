use crate::app::MapReduceApp;
use crate::kv::KeyValue;

/// Normaliza un token: sólo alfanumérico y '_', en minúscula.
pub fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

/// WordCount: map emite `{palabra, "1"}` por ocurrencia, reduce cuenta.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn map(&self, _source: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .split_whitespace()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .map(|t| KeyValue::new(t, "1"))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Caso feliz: texto normal, mayúsculas, signos, etc.
    #[test]
    fn map_normalizes_and_emits_one_per_word() {
        let kvs = WordCount.map("in.txt", "Hola hola, mundo!!\nmundo   mundo_prueba");
        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();

        assert_eq!(keys, vec!["hola", "hola", "mundo", "mundo", "mundo_prueba"]);
        assert!(kvs.iter().all(|kv| kv.value == "1"));
    }

    #[test]
    fn map_on_empty_or_punctuation_only_input_emits_nothing() {
        assert!(WordCount.map("empty.txt", "").is_empty());
        assert!(WordCount.map("p.txt", " ... !! ,").is_empty());
    }

    #[test]
    fn reduce_counts_values() {
        let values = vec!["1".to_string(); 3];
        assert_eq!(WordCount.reduce("a", &values), "3");
    }
}
