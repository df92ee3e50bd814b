//! LLMSense Common - sensor summarization, LLM interpretation and evaluation
//!
//! Regression summaries of steel-plant energy data, interpreted by a local
//! text-generation backend and scored by reflection or debate protocols.

pub mod config;
pub mod dataset;
pub mod debate;
pub mod error;
pub mod evaluation;
pub mod interpretation;
pub mod llm_client;
pub mod prompts;
pub mod regression;
pub mod stats;
pub mod store;
pub mod transcript;
pub mod types;
pub mod verdict;

pub use config::Config;
pub use error::{Result, SenseError};
pub use types::*;
