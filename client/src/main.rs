mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use common::{config::normalize_base_url, routes, IntermediateStore, JobProgress};
use reqwest::Client;
use std::{fs, time::Duration};

use crate::cli::{Cli, Commands};

async fn fetch_progress(client: &Client, base_url: &str) -> Result<JobProgress> {
    let url = format!("{}{}", base_url, routes::JOB);
    let resp = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinator en {}", base_url))?
        .error_for_status()?;
    Ok(resp.json().await?)
}

fn print_progress(p: &JobProgress) {
    println!("Job:");
    println!("  fase: {:?}", p.phase);
    println!(
        "  map: {}/{} completados ({} en vuelo)",
        p.completed_map, p.n_map, p.in_progress_map
    );
    println!(
        "  reduce: {}/{} completados ({} en vuelo)",
        p.completed_reduce, p.n_reduce, p.in_progress_reduce
    );
    println!("  leases vencidos: {}", p.lease_expirations);
    println!("  reportes ignorados: {}", p.ignored_reports);
    println!("  inicio: {}", p.started_at);
    if let Some(fin) = p.finished_at {
        println!("  fin: {}", fin);
    }
}

/// Une las líneas de todas las particiones en un solo listado ordenado.
fn merged_results(store: &IntermediateStore) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for path in store.output_files()? {
        let content =
            fs::read_to_string(&path).with_context(|| format!("leyendo {}", path.display()))?;
        lines.extend(content.lines().map(str::to_string));
    }
    lines.sort();
    Ok(lines)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = normalize_base_url(&cli.coordinator);

    match cli.command {
        Commands::Status => {
            let p = fetch_progress(&client, &base_url).await?;
            print_progress(&p);
        }
        Commands::Wait { poll_ms } => loop {
            let p = fetch_progress(&client, &base_url).await?;
            if p.is_done() {
                print_progress(&p);
                break;
            }
            tokio::time::sleep(Duration::from_millis(poll_ms)).await;
        },
        Commands::Results { dir } => {
            for line in merged_results(&IntermediateStore::new(dir))? {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn merged_results_sorts_across_partitions() {
        let dir = TempDir::new().unwrap();
        let tmp = dir.path();
        fs::write(tmp.join("mr-out-0"), "b 2\n").unwrap();
        fs::write(tmp.join("mr-out-1"), "a 2\nc 1\n").unwrap();
        fs::write(tmp.join("mr-0-1"), "{}\n").unwrap();

        let lines = merged_results(&IntermediateStore::new(tmp)).unwrap();
        assert_eq!(lines, vec!["a 2", "b 2", "c 1"]);
    }
}
