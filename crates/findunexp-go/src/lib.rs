//! # findunexp-go
//!
//! Tree-sitter based scanner for Go sources that finds struct types
//! embedding a pointer to an unexported type, such as `struct { *t }`.
//!
//! The crate builds on `findunexp-core` (package model, filter, config) and
//! adds:
//!
//! - [`GoWorkspace`], a [`PackageSource`](findunexp_core::PackageSource)
//!   over GOROOT/GOPATH `src` trees with Go build-constraint handling
//! - [`SyntaxTree`] and the [`ast`] view of struct types
//! - [`find_embedding_matches`], the matcher
//! - [`Reporter`] and [`printer::render`] for output
//! - [`Scanner`], which drives a full run
//!
//! ```no_run
//! use findunexp_core::ReportFormat;
//! use findunexp_go::{BuildContext, GoWorkspace, Reporter, Scanner};
//!
//! let workspace = GoWorkspace::new(BuildContext::from_env());
//! let reporter = Reporter::new(std::io::stdout().lock(), ReportFormat::Text);
//! let mut scanner = Scanner::new("^example.com/", workspace, reporter)?;
//! let summary = scanner.run()?;
//! println!("{} structs", summary.matches);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod build;
pub mod matcher;
pub mod printer;
pub mod report;
pub mod scanner;
pub mod selector;
pub mod syntax;
pub mod workspace;

pub use build::BuildContext;
pub use matcher::{find_embedding_matches, EmbeddingMatch};
pub use report::Reporter;
pub use scanner::{ScanError, ScanSummary, Scanner};
pub use selector::{select_and_parse, FileSelection};
pub use syntax::{ParseError, SyntaxTree};
pub use workspace::GoWorkspace;
