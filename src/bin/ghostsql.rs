//! # GhostSQL Server Entry Point
//!
//! ```bash
//! ghostsql                       # interactive shell against ./data
//! ghostsql --interactive false   # read statements from stdin
//! ghostsql --port 5433           # accepted, unused in this revision
//! ```

use eyre::{bail, Result, WrapErr};
use ghostsql::cli::{execute_line, Repl};
use ghostsql::Database;
use std::env;
use std::io::BufRead;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut port: u16 = 5433;
    let mut interactive = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("ghostsql {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--port" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| eyre::eyre!("--port needs a value"))?;
                port = value
                    .parse()
                    .wrap_err_with(|| format!("invalid port: {value}"))?;
            }
            "--interactive" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| eyre::eyre!("--interactive needs a value"))?;
                interactive = value
                    .parse()
                    .wrap_err_with(|| format!("invalid boolean: {value}"))?;
            }
            arg => bail!("unknown option: {arg}"),
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ghostsql=info")),
        )
        .init();

    println!("╔═══════════════════════════════════════╗");
    println!("║         GhostSQL Database             ║");
    println!("║     High-Performance SQL + Vectors    ║");
    println!("╚═══════════════════════════════════════╝");
    println!();

    let db = Database::initialize().wrap_err("failed to initialize database")?;

    if interactive {
        let mut repl = Repl::new(&db)?;
        repl.run()?;
    } else {
        tracing::info!(port, "networking not implemented; reading statements from stdin");
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.wrap_err("failed to read stdin")?;
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input == "exit" || input == "quit" {
                break;
            }
            execute_line(&db, input);
        }
    }

    db.shutdown().wrap_err("failed to shut down cleanly")?;
    Ok(())
}

fn print_usage() {
    println!("Usage: ghostsql [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <int>          Port to listen on (default 5433; unused)");
    println!("  --interactive <bool>  Interactive shell (default true)");
    println!("  --help, -h            Show this help");
    println!("  --version, -v         Show version");
}
