//! # Post Module
//!
//! Turns a now-playing record into something the publisher can send.
//!
//! - [`assembler`] - caption text and the ordered hashtag list
//! - [`facets`] - final text with hashtag facets at UTF-8 byte offsets
//! - [`normalizer`] - cover art normalization under pixel and byte budgets
//!
//! None of these touch the network or the ledger.

pub mod assembler;
pub mod facets;
pub mod normalizer;

pub use assembler::{assemble, track_line};
pub use facets::build_facets;
pub use normalizer::{ImageError, normalize};
