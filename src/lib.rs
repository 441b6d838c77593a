//! scalptester: intraday scalping strategy backtester.
//!
//! Hexagonal architecture: the pure engine lives in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`], and the clap front
//! end in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
