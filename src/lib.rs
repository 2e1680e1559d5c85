pub mod analyst;
pub mod clients;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod publisher;

pub use error::{PipelineError, Result};
pub use pipeline::{OutputFormat, Pipeline, RunReport, write_pages};

