use clap::Parser;
use sheets_etl::utils::{logger, validation::Validate};
use sheets_etl::{run_timestamp, CliConfig, FetchRunner, GoogleSheetsClient, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting Superbetin data fetch");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    let credential = match config.service_account_json() {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let client = match GoogleSheetsClient::new(&credential) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("❌ {}", e);
            std::process::exit(2);
        }
    };

    let output_path = config.output_path.clone();
    let storage = LocalStorage::new(output_path.clone());
    let runner = FetchRunner::new(client, storage, config);

    let generated = run_timestamp();
    tracing::info!("Timestamp: {}", generated);

    match runner.run(&generated).await {
        Ok(summary) => {
            for (platform, count) in &summary.counts {
                tracing::info!("{}: {} records", platform, count);
            }
            println!(
                "✅ Superbetin data fetch complete! {} files written to {}",
                summary.files_written.len(),
                output_path
            );
        }
        Err(e) => {
            tracing::error!("Data fetch failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
