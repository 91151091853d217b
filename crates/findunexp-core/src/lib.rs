//! # findunexp-core
//!
//! Core types for scanning Go package trees.
//!
//! This crate knows nothing about Go syntax. It provides:
//!
//! - [`PackageSource`] trait for the package discovery mechanism
//! - [`PackageDescriptor`] with the file-selection priority order
//! - [`PackageFilter`] for import-path gating and error classification
//! - [`Config`] for TOML-based settings
//!
//! ## Example
//!
//! ```ignore
//! use findunexp_core::{PackageFilter, Verdict};
//!
//! let filter = PackageFilter::from_pattern("^github.com/acme/")?;
//! if filter.should_process(&path) {
//!     match filter.classify(&path, source.resolve(&path)) {
//!         Verdict::Proceed(pkg) => scan(pkg),
//!         Verdict::SkipWithMessage(msg) => println!("{msg}"),
//!         Verdict::SkipSilently => {}
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filter;
mod package;
mod types;

pub use config::{Config, ConfigError, OutputConfig, ScanConfig};
pub use filter::{PackageFilter, PatternError, Verdict, MATCH_ALL};
pub use package::{ImportPath, PackageDescriptor, PackageSource, ResolveError};
pub use types::{ReportFormat, SourcePosition};
