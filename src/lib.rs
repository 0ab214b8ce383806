pub mod block;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod report;
pub mod stats;
pub mod trace;
