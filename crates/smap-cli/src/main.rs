// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! smap - inspect the mappings of a JavaScript source map.
//!
//! Decodes the VLQ `mappings` of a source map and either prints every
//! position entry or sums generated bytes by original source.

mod commands;
mod report;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smap_cli_config::{
	load_config_with_cli,
	runtime::{LogFormat, LogLevel, LoggingConfig},
	CliOverrides, SmapConfig,
};
use smap_decode::ParseOptions;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "smap", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long, global = true)]
	json_logs: bool,

	/// Reject generated columns that move backwards within a line
	#[arg(long, global = true)]
	strict: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Sum generated bytes attributed to each original source
	Report {
		/// Source map file
		file: PathBuf,

		/// Only show the largest N sources
		#[arg(long)]
		top: Option<usize>,

		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},

	/// Print every decoded mapping entry
	Dump {
		/// Source map file
		file: PathBuf,

		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},

	/// Decode a single base64 VLQ run
	Vlq {
		segment: String,
	},
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		let report_top = match &args.command {
			Command::Report { top, .. } => *top,
			_ => None,
		};

		CliOverrides {
			log_level: args.log_level.clone(),
			log_format: if args.json_logs {
				Some("json".to_string())
			} else {
				None
			},
			strict_columns: args.strict.then_some(true),
			report_top,
			config_file: args.config.clone(),
		}
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let level = log_level_to_tracing(logging.level);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		EnvFilter::new(format!(
			"smap={level},smap_decode={level},smap_cli_config={level}"
		))
	});

	// stdout carries command output only
	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(io::stderr))
				.init();
		}
	}
}

fn run(command: Command, config: &SmapConfig) -> Result<()> {
	let options = ParseOptions {
		strict_columns: config.parse.strict_columns,
	};
	let stdout = io::stdout();
	let mut out = BufWriter::new(stdout.lock());

	match command {
		Command::Report { file, format, .. } => {
			let doc = commands::load_document(&file)?;
			commands::report(&doc, options, &config.report, format, &mut out)?;
		}
		Command::Dump { file, format } => {
			let doc = commands::load_document(&file)?;
			let count = commands::dump(&doc, options, format, &mut out)?;
			info!(entries = count, "decoded mappings");
		}
		Command::Vlq { segment } => {
			commands::vlq(&segment, &mut out)?;
		}
	}

	out.flush().context("failed to write output")?;
	Ok(())
}

fn main() -> Result<()> {
	let args = Args::parse();

	let cli_overrides = CliOverrides::from(&args);
	let config = load_config_with_cli(cli_overrides).context("failed to load configuration")?;

	init_tracing(&config.logging);

	debug!(
		strict_columns = config.parse.strict_columns,
		top = ?config.report.top,
		"starting smap"
	);

	run(args.command, &config)
}
