//! Core domain types and the backtest engine.

pub mod backtest;
pub mod bar;
pub mod config;
pub mod config_validation;
pub mod daily;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod path_policy;
pub mod position;
pub mod signal;
pub mod strategy;
