use anyhow::{bail, Context, Result};
use clap::Parser;
use common::config::{COORDINATOR_ADDR_ENV, DEFAULT_COORDINATOR_ADDR};
use coordinator::{serve_until_done, AppState};
use glob::glob;
use std::{path::Path, time::Duration};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coordinator")]
#[command(about = "Reparte tareas map/reduce a los workers hasta terminar el job")]
struct Args {
    /// Archivos de entrada (rutas o patrones glob); una tarea map por archivo
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Cantidad de particiones de reduce
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    n_reduce: u32,

    /// Dirección donde escuchar
    #[arg(long, env = COORDINATOR_ADDR_ENV, default_value = DEFAULT_COORDINATOR_ADDR)]
    addr: String,

    /// Segundos antes de que una tarea sin reportar se pueda reasignar
    #[arg(long, default_value_t = 10)]
    lease_secs: u64,

    /// Cada cuántos ms se revisa si el job terminó
    #[arg(long, default_value_t = 1000)]
    poll_ms: u64,
}

/// Expande los patrones glob; lo que no es patrón se toma tal cual.
fn expand_inputs(inputs: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for input in inputs {
        let is_pattern = input.contains(['*', '?', '[']);
        if !is_pattern {
            files.push(input.clone());
            continue;
        }

        let mut matched: Vec<String> = Vec::new();
        for entry in glob(input).with_context(|| format!("patrón inválido: {}", input))? {
            let path = entry?;
            if Path::new(&path).is_file() {
                matched.push(path.to_string_lossy().to_string());
            }
        }
        matched.sort();
        files.extend(matched);
    }

    if files.is_empty() {
        bail!("ningún archivo de entrada coincide con {:?}", inputs);
    }
    Ok(files)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let files = expand_inputs(&args.inputs)?;

    info!(
        "job con {} maps y {} reduces (lease {}s)",
        files.len(),
        args.n_reduce,
        args.lease_secs
    );

    let state = AppState::new(
        files,
        args.n_reduce as usize,
        Duration::from_secs(args.lease_secs),
    );

    let listener = TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", args.addr))?;

    serve_until_done(listener, state, Duration::from_millis(args.poll_ms)).await?;
    Ok(())
}
