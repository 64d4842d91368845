// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hwl-bridge` server binary.
//!
//! Reads its configuration from the environment (and a `.env` file when
//! present) and serves the REST API on all interfaces.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hwl_bridge::config::BridgeConfig;
use hwl_bridge::dispatch::Dispatcher;
use hwl_bridge::server::{self, AppState};

/// CLI arguments, overriding the environment.
#[derive(Parser, Debug)]
#[command(name = "hwl-bridge", version, about = "Local REST bridge for HomeWizard Lite smart plugs")]
struct Args {
    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the device state records.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "LOGLEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = BridgeConfig::from_env()?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(dir) = args.state_dir {
        config = config.with_state_dir(dir);
    }

    tracing::debug!(config = ?config, "Loaded configuration");

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.web_port()));
    let dispatcher = Dispatcher::builder(config).build().await?;
    let app = server::router(AppState::new(dispatcher));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HWL bridge listening");

    axum::serve(listener, app).await?;
    Ok(())
}
