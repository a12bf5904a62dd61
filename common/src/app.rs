use std::sync::Arc;

use crate::indexer::Indexer;
use crate::kv::KeyValue;
use crate::wordcount::WordCount;

/// Lógica de negocio de un job: la función map y la función reduce.
///
/// Las dos deberían ser puras; el worker puede llamarlas más de una vez
/// para la misma tarea si ésta se reasigna.
pub trait MapReduceApp: Send + Sync {
    fn map(&self, source: &str, contents: &str) -> Vec<KeyValue>;

    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Nombres aceptados por `app_by_name`.
pub const APP_NAMES: &[&str] = &["wordcount", "indexer"];

pub fn app_by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wordcount" | "wc" => Some(Arc::new(WordCount)),
        "indexer" => Some(Arc::new(Indexer)),
        _ => None,
    }
}
