mod catalog;
mod db;
mod error;
mod web;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog::LookupLists;
use db::Database;
use web::AppState;

/// Read-only JSON catalog of internet infrastructure.
#[derive(Parser, Debug)]
#[command(name = "infra_catalog", version, about)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8111)]
    port: u16,

    /// SQLite database holding the catalog schema
    #[arg(long, env = "DATABASE_URL", default_value = "catalog.db")]
    database_url: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let db = Database::new(&cli.database_url);

    // One-shot snapshot for the process lifetime; a restart picks up new rows.
    let lookups = {
        let conn = db
            .connect()
            .with_context(|| format!("failed to open database at '{}'", db.path()))?;
        LookupLists::load(&conn).context("failed to load lookup lists")?
    };
    info!(
        domains = lookups.domains.len(),
        organizations = lookups.organizations.len(),
        ips = lookups.ips.len(),
        "loaded lookup lists"
    );

    web::serve(AppState { db, lookups }, &cli.host, cli.port)
        .await
        .context("http server failed")?;

    Ok(())
}
