//! Model-backed diagnosis: prompt construction, the Gemini client, and
//! extraction of the fix list from the model's free-form answer.

pub mod client;
pub mod models;
pub mod parse;
pub mod prompts;

pub use client::GeminiClient;
pub use models::ModelInfo;
pub use parse::{
    decode_fix_batch, parse_fix_list, BalancedScan, ExtractStrategy, NaiveBracketScan,
};
pub use prompts::{diagnosis_prompt, TraceContext};
