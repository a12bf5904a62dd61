use clap::{Parser, Subcommand};
use common::config::{COORDINATOR_URL_ENV, DEFAULT_COORDINATOR_URL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el coordinator")]
pub struct Cli {
    /// URL del coordinator
    #[arg(long, global = true, env = COORDINATOR_URL_ENV, default_value = DEFAULT_COORDINATOR_URL)]
    pub coordinator: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Muestra el avance del job
    Status,
    /// Espera hasta que el job termine
    Wait {
        /// Cada cuántos ms preguntar
        #[arg(long, default_value_t = 1000)]
        poll_ms: u64,
    },
    /// Junta las salidas mr-out-* de un directorio y las imprime ordenadas
    Results {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}
