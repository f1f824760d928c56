use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use printer_z::QueryId;

mod logger;
mod render;

#[derive(Parser)]
#[command(name = "printer-z-console")]
#[command(about = "Decode printer status query responses")]
struct Cli {
    /// Print decoded fields and logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a captured response read from a file or stdin
    Decode {
        /// Query the response answers (FN, FL or ST)
        #[arg(long, value_parser = parse_query)]
        query: QueryId,

        /// Captured response; stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List supported queries
    Queries,
}

fn parse_query(s: &str) -> Result<QueryId, String> {
    s.parse::<QueryId>().map_err(|_| {
        let known: Vec<_> = QueryId::all().map(QueryId::code).collect();
        format!("unknown query {s:?}, expected one of {}", known.join(", "))
    })
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.json, cli.debug);

    match cli.command {
        Command::Decode { query, file } => {
            let text = read_input(file.as_ref())?;
            tracing::debug!(query = %query, bytes = text.len(), "Decoding response");
            let decoded = printer_z::decode(query, &text)
                .with_context(|| format!("failed to decode {} response", query))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&decoded)?);
            } else {
                print!("{}", render::render(&decoded));
            }
        }
        Command::Queries => {
            for query in QueryId::all() {
                if cli.json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "code": query.code(),
                            "request": query.request(),
                            "description": query.description(),
                        })
                    );
                } else {
                    println!("{:<4} {:<8} {}", query.code(), query.request(), query.description());
                }
            }
        }
    }

    Ok(())
}
