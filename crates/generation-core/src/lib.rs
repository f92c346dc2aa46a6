//! Generation Core - LLM-backed requirement extraction and test case generation
//!
//! This crate provides:
//! - The `TextGenerator` capability and its Gemini client
//! - `RequirementExtractor`: document text -> requirements
//! - `TestCaseGenerator`: requirement + compliance context -> test cases
//! - Strict parsing of model responses

pub mod error;
pub mod extractor;
pub mod generator;
pub mod provider;
pub mod response;

pub use error::GenerationError;
pub use extractor::RequirementExtractor;
pub use generator::TestCaseGenerator;
pub use provider::{GeminiClient, GeminiConfig, GenerationParams, TextGenerator};
