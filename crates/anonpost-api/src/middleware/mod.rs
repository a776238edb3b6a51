//! # HTTP Middleware
//!
//! - `metrics`: request counters and latency histograms.

pub mod metrics;
