use anyhow::{anyhow, Context, Result};
use clap::Parser;
use common::{
    app_by_name,
    config::{COORDINATOR_URL_ENV, DEFAULT_COORDINATOR_URL},
    IntermediateStore, APP_NAMES,
};
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;
use worker::{CoordinatorClient, Worker};

#[derive(Parser)]
#[command(name = "worker")]
#[command(about = "Pide tareas map/reduce al coordinator y las ejecuta")]
struct Args {
    /// Aplicación a ejecutar (wordcount, indexer)
    #[arg(long, default_value = "wordcount")]
    app: String,

    /// URL del coordinator
    #[arg(long, env = COORDINATOR_URL_ENV, default_value = DEFAULT_COORDINATOR_URL)]
    coordinator: String,

    /// Directorio compartido para intermedios y salidas
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Espera en ms cuando no hay tareas libres
    #[arg(long, default_value_t = 1000)]
    wait_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let args = Args::parse();

    let app = app_by_name(&args.app).ok_or_else(|| {
        anyhow!(
            "aplicación desconocida {:?} (disponibles: {})",
            args.app,
            APP_NAMES.join(", ")
        )
    })?;

    // Nombre de host (solo para los logs)
    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let name = format!("{}-{}", hostname, std::process::id());

    let client = CoordinatorClient::new(&args.coordinator)
        .context("no se pudo crear el cliente HTTP")?;
    info!(
        "worker {} ({}) contra {}, store en {}",
        name,
        args.app,
        client.base_url(),
        args.dir.display()
    );

    let summary = Worker::new(client, app, IntermediateStore::new(&args.dir))
        .with_name(name)
        .with_wait_backoff(Duration::from_millis(args.wait_ms))
        .run()
        .await
        .context("error local ejecutando una tarea")?;

    info!(
        "worker terminó: {} maps, {} reduces",
        summary.maps_run, summary.reduces_run
    );
    Ok(())
}
