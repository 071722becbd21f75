mod commands;
mod config;
mod error;

use clap::Parser;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = config::Cli::parse();
    let settings = config::load(&cli)?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "bank={level},bank_client={level},api_types={level}",
            level = settings.level
        ))
        .init();

    let client = commands::client(&settings)?;
    let mut out = std::io::stdout().lock();
    if let Err(err) = commands::run(&client, &settings, cli.command, &mut out).await {
        tracing::error!("{err}");
        return Err(err);
    }
    Ok(())
}
