//! LifeDash
//!
//! An MCP server for academics, productivity and vitality tracking.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifedash::build_info;
use lifedash::config::Config;
use lifedash::db::{self, Database};
use lifedash::mcp::LifeDashService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stderr keeps stdout free for the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lifedash=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path, config.pool_size)?;

    database.with_conn(|conn| {
        if db::migrations::needs_migration(conn)? {
            info!("migrating database schema");
        }
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        info!(version, pool_size = config.pool_size, "database ready");
        Ok(())
    })?;

    let service = LifeDashService::new(config.database_path.clone(), database);
    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
