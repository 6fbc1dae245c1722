use super::GenerationResult;
use crate::types::{AspectRatio, ChatMessage, ImageInput};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Incremental text chunks of a streamed reply, in arrival order.
pub type TextStream = BoxStream<'static, GenerationResult<String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatTier {
    /// Slower, more capable model; replies arrive whole.
    Complex,
    /// Lightweight model; replies are streamed.
    Fast,
}

impl ChatTier {
    pub fn system_instruction(self) -> &'static str {
        match self {
            ChatTier::Complex => {
                "You are a helpful and knowledgeable assistant. Provide detailed and well-structured answers."
            }
            ChatTier::Fast => {
                "You are an extremely fast and concise AI assistant. Your primary goal is to provide immediate, to-the-point answers. Avoid pleasantries and lengthy explanations."
            }
        }
    }

    pub fn streams(self) -> bool {
        matches!(self, ChatTier::Fast)
    }
}

/// Image bytes returned inline, still base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRequest {
    pub image: ImageInput,
    pub prompt: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// Handle to a long-running video job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub video_uri: Option<String>,
    /// Set when the job itself failed upstream.
    pub error: Option<String>,
}

/// Everything the app asks of the hosted model API.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_images(&self, prompt: &str) -> GenerationResult<Vec<InlineImage>>;

    /// Runs an image+instruction request; `None` when no image part came back.
    async fn edit_image(
        &self,
        image: &ImageInput,
        instruction: &str,
    ) -> GenerationResult<Option<InlineImage>>;

    async fn chat(
        &self,
        tier: ChatTier,
        history: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<String>;

    async fn chat_stream(
        &self,
        tier: ChatTier,
        history: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<TextStream>;

    async fn submit_video(&self, request: &VideoRequest) -> GenerationResult<VideoOperation>;

    async fn poll_video(&self, operation: &VideoOperation) -> GenerationResult<VideoOperation>;

    async fn download_video(&self, uri: &str) -> GenerationResult<Vec<u8>>;

    /// Replaces the credential used for subsequent requests.
    fn set_api_key(&self, _key: Option<String>) {}
}
