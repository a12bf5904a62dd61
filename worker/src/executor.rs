use common::{
    kv::{group_sorted, partition_records},
    IntermediateStore, KeyValue, MapReduceApp,
};
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("no se pudo leer la entrada {path}: {source}")]
    ReadInput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("error escribiendo el intermedio mr-{map_index}-{reduce_index}: {source}")]
    WriteIntermediate {
        map_index: usize,
        reduce_index: usize,
        #[source]
        source: io::Error,
    },
    #[error("error leyendo el intermedio mr-{map_index}-{reduce_index}: {source}")]
    ReadIntermediate {
        map_index: usize,
        reduce_index: usize,
        #[source]
        source: io::Error,
    },
    #[error("error escribiendo la salida mr-out-{reduce_index}: {source}")]
    WriteOutput {
        reduce_index: usize,
        #[source]
        source: io::Error,
    },
    #[error("tarea map sin particiones de reduce")]
    NoPartitions,
    #[error("la tarea terminó de forma anormal: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Cuerpo de una tarea map:
/// 1. lee el archivo entero (bytes no UTF-8 se reemplazan, no fallan)
/// 2. aplica `map`
/// 3. reparte por `hash(key) % n_reduce`
/// 4. escribe cada bucket (aunque esté vacío) con rename atómico
///
/// Devuelve cuántos registros emitió el map.
pub fn run_map_task(
    app: &dyn MapReduceApp,
    store: &IntermediateStore,
    input_file: &str,
    map_index: usize,
    n_reduce: usize,
) -> Result<usize, TaskError> {
    if n_reduce == 0 {
        return Err(TaskError::NoPartitions);
    }

    let bytes = fs::read(input_file).map_err(|source| TaskError::ReadInput {
        path: input_file.to_string(),
        source,
    })?;
    let contents = String::from_utf8_lossy(&bytes);

    let records = app.map(input_file, &contents);
    let emitted = records.len();

    for (reduce_index, bucket) in partition_records(records, n_reduce).iter().enumerate() {
        store
            .write_intermediate(map_index, reduce_index, bucket)
            .map_err(|source| TaskError::WriteIntermediate {
                map_index,
                reduce_index,
                source,
            })?;
    }

    debug!(
        "map {} ({}) emitió {} registros en {} particiones",
        map_index, input_file, emitted, n_reduce
    );
    Ok(emitted)
}

/// Cuerpo de una tarea reduce:
/// 1. junta `mr-<m>-<r>` de todos los maps (si falta uno, cuenta como vacío)
/// 2. ordena por clave (orden estable por bytes)
/// 3. aplica `reduce` por cada clave distinta
/// 4. escribe `mr-out-<r>` con rename atómico
/// 5. borra los intermedios de la partición
///
/// Devuelve cuántas claves distintas escribió.
pub fn run_reduce_task(
    app: &dyn MapReduceApp,
    store: &IntermediateStore,
    reduce_index: usize,
    n_map: usize,
) -> Result<usize, TaskError> {
    let mut records: Vec<KeyValue> = Vec::new();

    for map_index in 0..n_map {
        let part = store
            .read_intermediate(map_index, reduce_index)
            .map_err(|source| TaskError::ReadIntermediate {
                map_index,
                reduce_index,
                source,
            })?;

        match part {
            Some(kvs) => records.extend(kvs),
            None => debug!("falta mr-{}-{}, se toma como vacío", map_index, reduce_index),
        }
    }

    records.sort_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));

    let groups = group_sorted(&records);
    let distinct = groups.len();
    let lines = groups
        .into_iter()
        .map(|(key, values)| (key, app.reduce(key, &values)));

    store
        .write_output(reduce_index, lines)
        .map_err(|source| TaskError::WriteOutput {
            reduce_index,
            source,
        })?;

    for map_index in 0..n_map {
        if let Err(e) = store.remove_intermediate(map_index, reduce_index) {
            warn!("no se pudo borrar mr-{}-{}: {}", map_index, reduce_index, e);
        }
    }

    Ok(distinct)
}
