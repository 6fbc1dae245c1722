//! Requests to the hosted generative model API.
//!
//! # Architecture
//!
//! - `backend` - the `GenerativeBackend` trait every model call goes through
//! - `gemini` - the Gemini REST implementation (reqwest, plus rig for blocking chat)
//! - `orchestrator` - input validation, response checks, error normalisation and
//!   video job polling on top of a backend
//! - `error` - failure taxonomy and the messages shown to users
//!
//! # Usage
//!
//! ```rust,no_run
//! use dreamcanvas::ai::Orchestrator;
//! use dreamcanvas::config::Settings;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let orchestrator = Orchestrator::from_settings(&Settings::from_env()?);
//! let image = orchestrator.generate_image("a lighthouse at dawn").await?;
//! println!("{}", image.mime_type().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod gemini;
mod orchestrator;

pub use backend::{ChatTier, GenerativeBackend, InlineImage, TextStream, VideoOperation, VideoRequest};
pub use error::{GenerationError, GenerationResult, INVALID_CREDENTIAL_SIGNATURE, Operation};
pub use gemini::{GeminiBackend, StreamFrame, first_inline_image, parse_gemini_sse_data, parse_operation};
pub use orchestrator::{
    BACKGROUND_REMOVAL_INSTRUCTION, JobPhase, Orchestrator, StreamSink, VideoAsset,
    conversation_history,
};
