pub mod collaborators;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod telemetry;
pub mod workflow;
