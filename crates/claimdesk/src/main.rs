// SPDX-FileCopyrightText: 2026 Claimdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claimdesk - claim and ticket lifecycle coordinator for support desks.
//!
//! This is the binary entry point for the `claimdesk` CLI.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use claimdesk::DeskContext;
use claimdesk_bus::{DeskEvent, EventBus, Topic};

/// Claimdesk - claim and ticket lifecycle coordinator for support desks.
#[derive(Parser, Debug)]
#[command(name = "claimdesk", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the default hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => claimdesk_config::load_and_validate_path(path),
        None => claimdesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            claimdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let desk = match DeskContext::from_config(config) {
        Ok(desk) => desk,
        Err(err) => {
            eprintln!("claimdesk: {}", err.user_message());
            std::process::exit(1);
        }
    };

    let reported = print_bus_messages(desk.bus());
    desk.start();
    let result = commands::run(&desk, cli.command).await;
    desk.shutdown();

    if let Err(err) = result {
        // Most failures were already published on the bus and printed.
        if !reported.load(Ordering::Acquire) {
            eprintln!("error: {}", err.user_message());
        }
        std::process::exit(1);
    }
}

/// Prints bus errors and warnings to stderr. The returned flag is set once an
/// error has been printed.
fn print_bus_messages(bus: &EventBus) -> Arc<AtomicBool> {
    let reported = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&reported);
    bus.add(Topic::ERROR, move |event| {
        if let DeskEvent::Error(message) = event {
            eprintln!("error: {message}");
            flag.store(true, Ordering::Release);
        }
    });
    bus.add(Topic::WARNING, |event| {
        if let DeskEvent::Warning(message) = event {
            eprintln!("warning: {message}");
        }
    });
    reported
}

/// Initialize tracing subscriber with EnvFilter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("claimdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
