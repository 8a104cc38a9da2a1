pub mod client;
pub mod config;
pub mod error;

pub use client::{ProbeOutcome, run};
pub use config::ProbeConfig;
pub use error::ProbeError;
