use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// Par clave/valor: lo que emite `map` y lo que consume `reduce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Hash FNV-1a de 64 bits (`fnv::FnvHasher`) sobre los bytes de la clave,
/// recortado a 31 bits. No coincide con la variante de 32 bits.
pub fn key_hash(key: &str) -> u32 {
    let mut h = fnv::FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Partición de reduce a la que va `key`. Depende sólo de la clave,
/// así que una re-ejecución del map produce exactamente el mismo reparto.
///
/// `n_reduce` tiene que ser > 0.
pub fn partition_for(key: &str, n_reduce: usize) -> usize {
    key_hash(key) as usize % n_reduce
}

/// Reparte registros en `n_reduce` buckets conservando el orden original
/// dentro de cada bucket.
pub fn partition_records(records: Vec<KeyValue>, n_reduce: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
    for kv in records {
        let r = partition_for(&kv.key, n_reduce);
        buckets[r].push(kv);
    }
    buckets
}

/// Agrupa corridas contiguas de claves iguales. `records` ya tiene que
/// venir ordenado por clave.
pub fn group_sorted(records: &[KeyValue]) -> Vec<(&str, Vec<String>)> {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    let mut i = 0;
    while i < records.len() {
        let key = records[i].key.as_str();
        let mut j = i;
        let mut values = Vec::new();
        while j < records.len() && records[j].key == key {
            values.push(records[j].value.clone());
            j += 1;
        }
        groups.push((key, values));
        i = j;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_hash_es_fnv1a_de_64_bits_recortado() {
        assert_eq!(key_hash(""), 0xcbf2_9ce4_8422_2325_u64 as u32 & 0x7fff_ffff);
        assert_eq!(key_hash("a"), 0x0601_ec8c);
    }

    #[test]
    fn partition_for_es_determinista_y_en_rango() {
        for n in [1, 2, 3, 7, 10] {
            for key in ["a", "b", "c", "xyz", "otro", "", "ñandú"] {
                let p = partition_for(key, n);
                assert!(p < n);
                assert_eq!(p, partition_for(key, n));
            }
        }
    }

    #[test]
    fn key_hash_es_no_negativo_en_31_bits() {
        for key in ["a", "hola", "mundo_prueba", "0123456789"] {
            assert!(key_hash(key) <= 0x7fff_ffff);
        }
    }

    #[test]
    fn partition_records_conserva_multiconjunto_y_orden() {
        let input = vec![
            KeyValue::new("a", "1"),
            KeyValue::new("b", "1"),
            KeyValue::new("a", "2"),
            KeyValue::new("c", "1"),
        ];

        let buckets = partition_records(input.clone(), 3);
        assert_eq!(buckets.len(), 3);

        let mut all: Vec<KeyValue> = buckets.iter().flatten().cloned().collect();
        let mut expected = input;
        all.sort_by(|x, y| (&x.key, &x.value).cmp(&(&y.key, &y.value)));
        expected.sort_by(|x, y| (&x.key, &x.value).cmp(&(&y.key, &y.value)));
        assert_eq!(all, expected);

        // las dos "a" caen en el mismo bucket y en el orden de entrada
        let bucket_a = &buckets[partition_for("a", 3)];
        let values: Vec<&str> = bucket_a
            .iter()
            .filter(|kv| kv.key == "a")
            .map(|kv| kv.value.as_str())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn group_sorted_agrupa_corridas() {
        let records = vec![
            KeyValue::new("a", "1"),
            KeyValue::new("a", "1"),
            KeyValue::new("b", "1"),
            KeyValue::new("c", "3"),
        ];
        let groups = group_sorted(&records);
        assert_eq!(
            groups,
            vec![
                ("a", vec!["1".to_string(), "1".to_string()]),
                ("b", vec!["1".to_string()]),
                ("c", vec!["3".to_string()]),
            ]
        );
        assert!(group_sorted(&[]).is_empty());
    }
}
