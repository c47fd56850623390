//! # filewrap-core
//!
//! A library for embedding arbitrary binary files into generated C++ sources.
//!
//! Given a list of input files, it produces:
//! - a declaration artifact (`.h`) with the `FileToc` record type and two
//!   accessor declarations
//! - a definition artifact (`.cc`) with one string literal per file, a
//!   sentinel-terminated `FileToc` table and the accessor bodies
//!
//! ## Architecture
//!
//! - [`escape`]: byte to string-literal token escaping
//! - [`ident`]: derivation of generated symbol names
//! - [`context`]: per-run naming context and configuration
//! - [`artifact`]: table of contents and artifact emission
//! - [`transcode`]: the driver streaming inputs into the definition artifact
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```no_run
//! use filewrap_core::{generate, EmbedContext, TranscoderConfig};
//! use std::path::Path;
//!
//! let ctx = EmbedContext::new("my/package", "my-files")?.namespace("assets");
//! let toc = generate(
//!     &ctx,
//!     &TranscoderConfig::default(),
//!     Path::new("my_files.h"),
//!     Path::new("my_files.cc"),
//!     &["logo.png", "schema.sql"],
//! )?;
//! println!("embedded {} files", toc.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod artifact;
pub mod context;
pub mod error;
pub mod escape;
pub mod ident;
pub mod transcode;

// Re-export primary types for convenience
pub use artifact::{render_declaration, DefinitionWriter, FileRecord, Toc, TocRow};
pub use context::{EmbedContext, TranscoderConfig};
pub use error::{Error, Result};
pub use escape::{escape_byte, write_escaped, EscapeClass};
pub use transcode::{generate, Transcoder};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the legacy digest field in `FileToc`. Always zero-filled.
pub const DIGEST_LEN: usize = 16;
