//! munkibatch library exports.
//!
//! The binary in `main.rs` is a thin clap wrapper; integration tests drive
//! these modules directly.

pub mod batch;
pub mod config;
pub mod munkipkg;
pub mod output;
pub mod ownership;
pub mod package;
pub mod preflight;
pub mod process;
pub mod relocate;
pub mod timing;
