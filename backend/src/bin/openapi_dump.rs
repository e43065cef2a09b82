//! Print the OpenAPI document for external tooling.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use facility_backend::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// Dump the facility API description to stdout.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump")]
struct Args {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => doc.to_pretty_json().wrap_err("failed to render JSON")?,
        Format::Yaml => doc.to_yaml().wrap_err("failed to render YAML")?,
    };
    println!("{rendered}");
    Ok(())
}
