//! Reusable blocks slot API server
//!
//! Serves the slot inventory and render endpoints over an in-memory store
//! seeded from a JSON fixture.
//!
//! ## Usage
//!
//! ```bash
//! reusable-blocks-server --settings settings.toml --fixtures blocks.json --addr 127.0.0.1:8000
//! ```
//!
//! Log output is controlled with `RUST_LOG`.

use anyhow::Context as _;
use clap::Parser;
use reinhardt_reusable_blocks_api::{ApiServer, SlotsApi};
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use reinhardt_reusable_blocks_core::store::InMemoryDocumentStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reusable-blocks-server")]
#[command(about = "Serve the reusable blocks slot API", long_about = None)]
#[command(version)]
struct Cli {
	/// TOML settings file (`[reusable_blocks]` table or top level)
	#[arg(long, value_name = "PATH")]
	settings: Option<String>,

	/// JSON array of reusable blocks to load at startup
	#[arg(long, value_name = "PATH")]
	fixtures: Option<PathBuf>,

	/// Address to listen on
	#[arg(long, default_value = "127.0.0.1:8000")]
	addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let cli = Cli::parse();

	let settings = ReusableBlocksSettings::load(cli.settings.as_deref())
		.context("failed to load reusable block settings")?;

	let store = Arc::new(InMemoryDocumentStore::new().with_block_types(settings.block_types.clone()));
	if let Some(path) = &cli.fixtures {
		let json = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read fixtures from {}", path.display()))?;
		store
			.load_json(&json)
			.with_context(|| format!("failed to load fixtures from {}", path.display()))?;
	}

	let api = SlotsApi::new(store, &settings);
	let listener = tokio::net::TcpListener::bind(cli.addr)
		.await
		.with_context(|| format!("failed to bind {}", cli.addr))?;

	ApiServer::new(Arc::new(api))
		.serve(listener, async {
			let _ = tokio::signal::ctrl_c().await;
		})
		.await
}
