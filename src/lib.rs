//! kma-cli library
//!
//! This crate provides the core functionality for the `kma-cli` binary.
//! Keep the crate root minimal — implementation and tests live in their modules.
//!
//! ## Overview
//!
//! The library is organized into modules that handle different aspects of the
//! weather data collection pipeline:
//!
//! - [`downloader`] - Authenticated session handling, work plan expansion and
//!   the two-phase download protocol against the KMA open data portal
//! - [`extractor`] - Persists and extracts the downloaded ZIP archives,
//!   recovering EUC-KR entry filenames
//! - [`progress`] - Observation port for per-unit progress and written files
//! - [`status`] - Read-only summary of the collected data tree
//! - [`cli`] - Command-line interface orchestrating collection runs
//! - [`config`] - TOML run configuration and resolved defaults
//! - [`models`] - Collection types, regions, variables and work units
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! A collection run expands configuration into a work plan, authenticates,
//! and processes the plan strictly sequentially:
//!
//! ```no_run
//! use kma_cli::downloader::{self, Credential};
//! use kma_cli::models::CollectionType;
//! use kma_cli::progress::LogReporter;
//! use kma_cli::config::ResolvedConfig;
//! use std::sync::atomic::AtomicBool;
//!
//! # async fn example() -> kma_cli::errors::AppResult<()> {
//! let config = ResolvedConfig::default();
//! let credential = Credential {
//!     login_id: "user".into(),
//!     password: "secret".into(),
//! };
//! let regions = downloader::load_regions(&config.region_file)?;
//! let collection_type = CollectionType::ShortTermForecast;
//! let intervals = downloader::build_intervals(
//!     chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
//!     chrono::NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
//!     collection_type.profile().interval_mode,
//! );
//! let variables = kma_cli::models::resolve_variables(&["1시간기온".to_string()]);
//! let plan = downloader::build_plan(&regions, &intervals, &variables)?;
//!
//! let client = reqwest::Client::new();
//! let stop = AtomicBool::new(false);
//! let summary = downloader::run_collection(
//!     &client, &credential, collection_type, &plan, &config, &LogReporter, &stop,
//! ).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod errors;
pub mod extractor;
pub mod models;
pub mod progress;
pub mod status;
pub mod ui;
