//! CLI client for the linekv gateway

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "linekv")]
#[command(about = "linekv replicated line store CLI")]
#[command(version)]
struct Cli {
    /// Gateway host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Gateway port
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Command to run; starts an interactive prompt when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a line by index
    Read {
        /// Line index (non-negative)
        index: u64,
    },

    /// Write a line at an index
    Write {
        /// Line index (non-negative)
        index: u64,

        /// Line content
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let origin = format!("http://{}:{}", cli.host, cli.port);
    let client = reqwest::Client::new();

    match cli.command {
        Some(Commands::Read { index }) => read(&client, &origin, index).await,
        Some(Commands::Write { index, message }) => write(&client, &origin, index, &message).await,
        None => interactive(&client, &origin).await,
    }
}

async fn read(client: &reqwest::Client, origin: &str, index: u64) -> anyhow::Result<()> {
    let resp = client
        .get(origin)
        .json(&json!({ "index": index }))
        .send()
        .await
        .with_context(|| format!("request to {origin} failed"))?;
    print_response(resp).await
}

async fn write(
    client: &reqwest::Client,
    origin: &str,
    index: u64,
    message: &str,
) -> anyhow::Result<()> {
    let resp = client
        .post(origin)
        .json(&json!({ "index": index, "message": message }))
        .send()
        .await
        .with_context(|| format!("request to {origin} failed"))?;
    print_response(resp).await
}

async fn print_response(resp: reqwest::Response) -> anyhow::Result<()> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    println!("{} {}", status.as_u16(), body);
    Ok(())
}

/// Prompt loop: `read <index>` / `write <index> <message...>` / `quit`.
async fn interactive(client: &reqwest::Client, origin: &str) -> anyhow::Result<()> {
    use std::io::{BufRead, Write as _};

    let stdin = std::io::stdin();
    loop {
        print!("cmd: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let mut parts = line.split_whitespace();
        let action = parts.next().unwrap_or_default();
        match action {
            "quit" | "exit" => return Ok(()),
            "read" | "write" => {}
            "" => continue,
            other => {
                eprintln!("unknown action '{other}'; expected: read <index> | write <index> <message>");
                continue;
            }
        }

        let Some(index) = parts.next().and_then(|s| s.parse::<u64>().ok()) else {
            eprintln!("index must be a non-negative number");
            continue;
        };

        let result = if action == "read" {
            read(client, origin, index).await
        } else {
            let message = parts.collect::<Vec<_>>().join(" ");
            let message = message.trim_matches('"');
            write(client, origin, index, message).await
        };
        if let Err(e) = result {
            eprintln!("{e:#}");
        }
    }
}
