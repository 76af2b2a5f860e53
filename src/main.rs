use ::tracing::info;
use anyhow::{Context, Result};
use std::process::ExitCode;

mod config;
mod container;
mod context;
mod db;
mod error;
mod scenario;
mod signal;
#[cfg(test)]
mod test_helpers;
mod tracing;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    #[cfg(feature = "dotenv")]
    dotenv::dotenv()?;

    let _guard = tracing::init()?;

    info!(
        "Launching {}, version: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = config::load().context("Failed to load config")?;
    info!("Scenario config: {:?}", config);

    let (ctx, ctx_guard) = context::ExecutionContext::with_timeout(config.scenario_timeout);
    let listener = signal::listen(ctx_guard.cancel_handle())?;

    let env = scenario::DockerEnvironment::new(config);
    let result = scenario::run(&env, &ctx).await;

    drop(ctx_guard);
    listener.stop().await;

    let report = serde_json::to_string(&result.report()).context("Failed to serialize report")?;
    println!("{}", report);

    Ok(ExitCode::from(result.exit_code()))
}
