use common::{app_by_name, partition_for, IntermediateStore, TaskAssignment};
use coordinator::AppState;
use std::{collections::HashMap, fs, path::Path, time::Duration};
use tempfile::TempDir;
use tokio::net::TcpListener;
use worker::{CoordinatorClient, Worker, WorkerSummary};

const POLL: Duration = Duration::from_millis(20);

/// Levanta un coordinator real en un puerto libre; se apaga solo al terminar el job.
async fn start_coordinator(
    files: Vec<String>,
    n_reduce: usize,
    lease: Duration,
) -> (AppState, String, tokio::task::JoinHandle<std::io::Result<()>>) {
    let state = AppState::new(files, n_reduce, lease);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(coordinator::serve_until_done(listener, state.clone(), POLL));
    (state, url, server)
}

fn write_inputs(dir: &Path, contents: &[&str]) -> Vec<String> {
    contents
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let path = dir.join(format!("pg-{}.txt", i));
            fs::write(&path, text).unwrap();
            path.to_string_lossy().to_string()
        })
        .collect()
}

fn new_worker(url: &str, store: &IntermediateStore, name: &str) -> Worker {
    let client = CoordinatorClient::new(url).unwrap();
    Worker::new(client, app_by_name("wordcount").unwrap(), store.clone())
        .with_name(name)
        .with_wait_backoff(Duration::from_millis(20))
}

/// Lee todas las salidas como (partición, línea).
fn read_outputs(store: &IntermediateStore) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for (r, path) in store.output_files().unwrap().iter().enumerate() {
        assert_eq!(path, &store.output_path(r));
        for line in fs::read_to_string(path).unwrap().lines() {
            out.push((r, line.to_string()));
        }
    }
    out
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn word_count_over_two_files() {
    let tmp = TempDir::new().unwrap();
    let store = IntermediateStore::new(tmp.path());
    let files = write_inputs(tmp.path(), &["a b a", "b c"]);

    let (state, url, server) = start_coordinator(files, 2, Duration::from_secs(10)).await;

    let summary = new_worker(&url, &store, "w0").run().await.unwrap();
    assert_eq!(summary.maps_run, 2);
    assert_eq!(summary.reduces_run, 2);
    assert!(state.is_done());
    server.await.unwrap().unwrap();

    let outputs = read_outputs(&store);
    let mut lines: Vec<&str> = outputs.iter().map(|(_, l)| l.as_str()).collect();
    lines.sort();
    assert_eq!(lines, vec!["a 2", "b 2", "c 1"]);

    // cada archivo sólo tiene las claves que caen en su partición,
    // en orden ascendente
    let mut per_partition: HashMap<usize, Vec<String>> = HashMap::new();
    for (r, line) in &outputs {
        let key = line.split(' ').next().unwrap().to_string();
        assert_eq!(partition_for(&key, 2), *r);
        per_partition.entry(*r).or_default().push(key);
    }
    for keys in per_partition.values() {
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    // los intermedios se borraron
    for m in 0..2 {
        for r in 0..2 {
            assert!(!store.intermediate_path(m, r).exists());
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn several_workers_share_the_job() {
    let tmp = TempDir::new().unwrap();
    let store = IntermediateStore::new(tmp.path());
    let texts = [
        "el perro y el gato",
        "el gato duerme",
        "un perro ladra",
        "y nada mas",
        "gato gato gato",
    ];
    let files = write_inputs(tmp.path(), &texts);

    let (_state, url, server) = start_coordinator(files, 3, Duration::from_secs(10)).await;

    let mut handles = Vec::new();
    for i in 0..3 {
        let w = new_worker(&url, &store, &format!("w{}", i));
        handles.push(tokio::spawn(async move { w.run().await.unwrap() }));
    }
    let mut total = WorkerSummary::default();
    for h in handles {
        let s = h.await.unwrap();
        total.maps_run += s.maps_run;
        total.reduces_run += s.reduces_run;
    }
    server.await.unwrap().unwrap();

    // sin timeouts cada tarea corre exactamente una vez
    assert_eq!(total.maps_run, texts.len());
    assert_eq!(total.reduces_run, 3);

    let mut got: HashMap<String, String> = HashMap::new();
    for (_, line) in read_outputs(&store) {
        let (k, v) = line.split_once(' ').unwrap();
        assert!(got.insert(k.to_string(), v.to_string()).is_none(), "clave repetida {k}");
    }
    assert_eq!(got["gato"], "5");
    assert_eq!(got["el"], "3");
    assert_eq!(got["perro"], "2");
    assert_eq!(got["mas"], "1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stalled_map_is_reassigned_after_lease() {
    let tmp = TempDir::new().unwrap();
    let store = IntermediateStore::new(tmp.path());
    let files = write_inputs(tmp.path(), &["x y", "y z"]);
    let lease = Duration::from_millis(300);

    let (state, url, server) = start_coordinator(files, 2, lease).await;

    // un worker "colgado": toma el map 0 y nunca reporta
    let stalled = CoordinatorClient::new(&url).unwrap();
    let first = stalled.request_task().await.unwrap();
    assert!(matches!(first, TaskAssignment::Map { map_index: 0, .. }));

    tokio::time::sleep(lease * 2).await;
    let again = stalled.request_task().await.unwrap();
    assert!(matches!(again, TaskAssignment::Map { map_index: 0, .. }));

    tokio::time::sleep(lease * 2).await;

    // un worker sano termina todo, incluido el map abandonado
    let summary = new_worker(&url, &store, "sano").run().await.unwrap();
    assert_eq!(summary.maps_run, 2);
    server.await.unwrap().unwrap();

    assert!(state.progress().lease_expirations >= 2);
    let mut lines: Vec<String> = read_outputs(&store).into_iter().map(|(_, l)| l).collect();
    lines.sort();
    assert_eq!(lines, vec!["x 1", "y 2", "z 1"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_stops_when_coordinator_is_gone() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let tmp = TempDir::new().unwrap();
    let store = IntermediateStore::new(tmp.path());

    let summary = new_worker(&url, &store, "solo").run().await.unwrap();
    assert_eq!(summary, WorkerSummary::default());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreadable_input_is_fatal_for_the_worker() {
    let tmp = TempDir::new().unwrap();
    let store = IntermediateStore::new(tmp.path());
    let missing = tmp.path().join("no_existe.txt").to_string_lossy().to_string();

    let (state, url, server) = start_coordinator(vec![missing], 1, Duration::from_secs(10)).await;

    let result = new_worker(&url, &store, "w").run().await;
    assert!(matches!(result, Err(worker::TaskError::ReadInput { .. })));

    // no se reportó nada: la tarea sigue en vuelo
    let progress = state.progress();
    assert_eq!(progress.completed_map, 0);
    assert_eq!(progress.in_progress_map, 1);
    server.abort();
}
