//! `service-poller` binary entry point.

use anyhow::Context;
use clap::Parser;

use service_poller::cli::Cli;
use service_poller::config::ServiceCatalog;
use service_poller::core::AppResult;
use service_poller::runtime;
use service_poller::util::init_tracing;

fn main() -> AppResult<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let cli = Cli::parse();
    let cfg = cli.to_config().context("invalid arguments")?;

    if cli.list {
        let catalog = ServiceCatalog::load(&cfg.catalog)?;
        for service in catalog.services() {
            match &service.description {
                Some(description) => println!("{}\t{}\t{}", service.name, service.url, description),
                None => println!("{}\t{}", service.name, service.url),
            }
        }
        return Ok(());
    }

    let summary = runtime::run(&cfg)?;
    tracing::info!(
        reason = %summary.reason,
        services = summary.services.len(),
        completed = summary.stats.completed_tasks,
        "Exiting"
    );
    Ok(())
}
