//! Oxibps: BPS binary patch creation and application in Rust.
//!
//! The crate provides:
//! - Suffix-array construction, longest-match search and LPF tables (`suffix`)
//! - The BPS patch format: varints, operations, encoder, decoder (`bps`)
//! - Greedy patch creation on top of both (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use oxibps::engine;
//!
//! let source = b"hello old world";
//! let target = b"hello new world";
//!
//! let patch = engine::encode(source, target);
//! let decoded = engine::decode(source, &patch).unwrap();
//! assert_eq!(decoded, target);
//! ```

pub mod bps;
pub mod engine;
pub mod io;
pub mod suffix;

#[cfg(feature = "cli")]
pub mod cli;
