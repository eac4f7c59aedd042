// ABOUTME: Binary entry point for the PawTrace server
// ABOUTME: Parses CLI overrides, initializes tracing, and runs the serve loop
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawTrace

//! PawTrace server binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pawtrace_server::{config::ServerConfig, server};

/// PawTrace campus pet-social backend
#[derive(Debug, Parser)]
#[command(name = "pawtrace-server", version, about)]
struct Args {
    /// HTTP listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Data directory for the JSON document store (overrides PAWTRACE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>,

    /// Frontend directory served as the SPA (overrides PAWTRACE_STATIC_DIR)
    #[arg(long)]
    static_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pawtrace_server=info,tower_http=warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    let resources = server::ServerResources::from_config(config).await?;
    server::serve(resources).await?;
    Ok(())
}
