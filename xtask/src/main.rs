//! Build automation tasks for Sumomine
//!
//! Currently one task: regenerating the CLI reference from the clap
//! definitions in `sumo-ingest`.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for Sumomine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<sumo_ingest::Cli>();

    let content = format!(
        r#"# sumo-ingest CLI Reference

Generated from the CLI source code. Last updated: {}.

## Overview

`sumo-ingest` imports wrestlers, tournaments, bouts and banzuke from the
public sumo-api.com JSON API into PostgreSQL, and answers statistics queries
over the stored bout ledger.

## Quick Start

```bash
export DATABASE_URL=postgres://localhost/sumomine

# Full wrestler catalog with rank, measurement and name history
sumo-ingest rikishi

# Tournament headers, then bouts for the configured range
sumo-ingest basho --from-year 2020
sumo-ingest bouts --from-year 2023 --divisions Makuuchi,Juryo

# Rebuild win/loss counters from the ledger
sumo-ingest records

# Head-to-head between two wrestlers
sumo-ingest stats head-to-head Hoshoryu Kotozakura
```

## Commands

{}

## Environment Variables

- `DATABASE_URL` - PostgreSQL connection string (required)
- `SUMO_API_BASE_URL` - Source API root (default: `https://sumo-api.com`)
- `SUMO_API_REQUEST_DELAY_MS` - Pause between requests (default: `100`)
- `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_DIR` - Logging overrides
- `RUST_LOG` - Per-module log filtering

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
