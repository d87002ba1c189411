//! Main entry point for the transaction batcher.
//!
//! `batcher run` loads the configuration and wallet files and drives every
//! wallet pair through the campaign stages. `batcher generate-wallets`
//! writes fresh keypairs in the wallet file format.

use batcher_account::{generate_wallets, write_wallet_file};
use batcher_config::Config;
use batcher_core::Driver;
use batcher_delivery::HttpGateway;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line arguments for the batcher.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, global = true, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run every campaign stage for every wallet pair.
	Run {
		/// Path to configuration file
		#[arg(short, long, default_value = "config.toml")]
		config: PathBuf,
	},
	/// Write freshly generated keypairs to a wallet file.
	GenerateWallets {
		/// Number of wallets to generate
		#[arg(short = 'n', long, default_value_t = 50)]
		count: usize,

		/// Output file, replaced if it exists
		#[arg(short, long, default_value = "wallet2.txt")]
		output: PathBuf,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	match cli.command {
		Command::Run { config } => run(&config).await,
		Command::GenerateWallets { count, output } => generate(count, &output).await,
	}
}

async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_file(config_path).await?;
	tracing::info!(
		rpc_url = %config.network.rpc_url,
		chain_id = config.network.chain_id,
		contract = %config.campaign.contract,
		"Loaded configuration"
	);

	let gateway = Arc::new(HttpGateway::new(&config.network)?);
	let driver = Driver::new(&config, gateway)?;

	let summary = driver.run().await?;
	tracing::info!(wallets = summary.wallets, "Stopped batcher");
	Ok(())
}

async fn generate(count: usize, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let wallets = generate_wallets(count);
	write_wallet_file(output, &wallets).await?;
	tracing::info!(count, output = %output.display(), "Generated wallets");
	Ok(())
}
