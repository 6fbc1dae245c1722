use super::{
    ChatTier, GenerationError, GenerationResult, GenerativeBackend, GeminiBackend, VideoRequest,
};
use crate::config::Settings;
use crate::types::{ChatMessage, DataUri, ImageInput, Role};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const BACKGROUND_REMOVAL_INSTRUCTION: &str =
    "Remove the background, make the background transparent";

const GENERATED_IMAGE_MIME: &str = "image/jpeg";
const VIDEO_MIME: &str = "video/mp4";

/// Receives the cumulative text of a streamed reply after every chunk.
pub trait StreamSink: Send {
    fn update(&mut self, text: &str);
}

impl<F: FnMut(&str) + Send> StreamSink for F {
    fn update(&mut self, text: &str) {
        self(text)
    }
}

/// Where a video job currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobPhase {
    Submitted,
    /// `checks` status requests have been answered so far.
    Polling { checks: u32 },
    Completed,
    Fetching,
    Ready,
    NoAsset,
    Failed(String),
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Ready | JobPhase::NoAsset | JobPhase::Failed(_))
    }
}

/// A finished video, held in memory until written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl VideoAsset {
    /// Writes the video under `dir` and returns the playable file path.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stamp = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
        let path = dir.join(format!("dreamcanvas-{stamp}.mp4"));
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Turns user intents into backend calls and normalises what comes back.
#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerativeBackend>,
    poll_interval: Duration,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(GeminiBackend::new(settings.clone())),
            settings.poll_interval,
        )
    }

    pub fn set_api_key(&self, key: Option<String>) {
        self.backend.set_api_key(key);
    }

    pub async fn generate_image(&self, prompt: &str) -> GenerationResult<DataUri> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::Validation("Please enter a prompt.".into()));
        }

        let images = self.backend.generate_images(prompt).await.map_err(|err| {
            tracing::error!(%err, "image generation failed");
            err
        })?;
        let first = images.into_iter().next().ok_or(GenerationError::EmptyResult)?;
        tracing::info!("image generated");
        Ok(DataUri::from_base64(GENERATED_IMAGE_MIME, &first.data))
    }

    pub async fn edit_image(
        &self,
        image: Option<&ImageInput>,
        instruction: &str,
    ) -> GenerationResult<DataUri> {
        let image = match image {
            Some(image) if !instruction.trim().is_empty() => image,
            _ => {
                return Err(GenerationError::Validation(
                    "Please upload an image and enter a prompt.".into(),
                ));
            }
        };
        self.run_edit(image, instruction).await
    }

    pub async fn remove_background(&self, image: &DataUri) -> GenerationResult<DataUri> {
        let input = ImageInput::from_data_uri(image)
            .ok_or_else(|| GenerationError::Validation("No generated image to process.".into()))?;
        self.run_edit(&input, BACKGROUND_REMOVAL_INSTRUCTION).await
    }

    async fn run_edit(&self, image: &ImageInput, instruction: &str) -> GenerationResult<DataUri> {
        let part = self
            .backend
            .edit_image(image, instruction)
            .await
            .map_err(|err| {
                tracing::error!(%err, "image edit failed");
                err
            })?;
        match part {
            Some(inline) => Ok(DataUri::from_base64(&inline.mime_type, &inline.data)),
            None => {
                tracing::warn!("edit response carried no image part");
                Err(GenerationError::NoImagePart)
            }
        }
    }

    /// One blocking turn. `transcript` is everything before `text`.
    pub async fn chat_turn(
        &self,
        tier: ChatTier,
        transcript: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<String> {
        let history = conversation_history(transcript);
        tracing::debug!(?tier, turns = history.len(), "sending chat turn");
        self.backend.chat(tier, &history, text).await
    }

    /// Streams one turn, pushing the text received so far to `sink` after each
    /// chunk. Returns the complete reply.
    pub async fn chat_turn_stream(
        &self,
        tier: ChatTier,
        transcript: &[ChatMessage],
        text: &str,
        mut sink: impl StreamSink,
    ) -> GenerationResult<String> {
        let history = conversation_history(transcript);
        tracing::debug!(?tier, turns = history.len(), "streaming chat turn");
        let mut stream = self.backend.chat_stream(tier, &history, text).await?;

        let mut full = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            full.push_str(&chunk);
            sink.update(&full);
        }
        Ok(full)
    }

    pub async fn animate_image(&self, request: &VideoRequest) -> GenerationResult<VideoAsset> {
        self.animate_image_observed(request, |_: &JobPhase| {}).await
    }

    /// Runs a video job to completion, reporting every phase change.
    ///
    /// The job is polled at a fixed interval with no attempt cap and no way to
    /// cancel; the asset is fetched once, after the final status check.
    pub async fn animate_image_observed(
        &self,
        request: &VideoRequest,
        mut on_phase: impl FnMut(&JobPhase) + Send,
    ) -> GenerationResult<VideoAsset> {
        if request.image.bytes.is_empty() {
            return Err(GenerationError::Validation(
                "Please upload an image to animate.".into(),
            ));
        }

        let mut enter = |phase: JobPhase| {
            tracing::debug!(?phase, "video job");
            on_phase(&phase);
        };

        let outcome = self.run_video_job(request, &mut enter).await;
        match outcome {
            Ok(asset) => {
                enter(JobPhase::Ready);
                tracing::info!(bytes = asset.bytes.len(), "video ready");
                Ok(asset)
            }
            Err(err) => {
                let err = err.classify_credential();
                if matches!(err, GenerationError::NoVideoLink) {
                    enter(JobPhase::NoAsset);
                } else {
                    enter(JobPhase::Failed(err.to_string()));
                }
                tracing::error!(%err, "video generation failed");
                Err(err)
            }
        }
    }

    async fn run_video_job(
        &self,
        request: &VideoRequest,
        enter: &mut (impl FnMut(JobPhase) + Send),
    ) -> GenerationResult<VideoAsset> {
        let request = VideoRequest {
            prompt: request
                .prompt
                .clone()
                .filter(|prompt| !prompt.trim().is_empty()),
            ..request.clone()
        };

        let mut operation = self.backend.submit_video(&request).await?;
        enter(JobPhase::Submitted);

        let mut checks = 0u32;
        while !operation.done {
            enter(JobPhase::Polling { checks });
            tokio::time::sleep(self.poll_interval).await;
            operation = self.backend.poll_video(&operation).await?;
            checks += 1;
        }
        enter(JobPhase::Completed);

        if let Some(message) = operation.error {
            return Err(GenerationError::Transport(message));
        }
        let uri = operation.video_uri.ok_or(GenerationError::NoVideoLink)?;

        enter(JobPhase::Fetching);
        let bytes = self.backend.download_video(&uri).await?;
        Ok(VideoAsset {
            bytes,
            mime_type: VIDEO_MIME.to_string(),
        })
    }
}

/// The turns worth sending back to the model.
///
/// Failed replies stand in for an answer that never came, so they are dropped
/// together with the user turn they answer. Empty replies are dropped the same
/// way.
pub fn conversation_history(transcript: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut history: Vec<ChatMessage> = Vec::with_capacity(transcript.len());
    for message in transcript {
        if message.role == Role::Model && (message.failed || message.text.is_empty()) {
            if history.last().is_some_and(|prev| prev.role == Role::User) {
                history.pop();
            }
            continue;
        }
        history.push(message.clone());
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(history: &[ChatMessage]) -> Vec<&str> {
        history.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn history_drops_failed_turns() {
        let transcript = vec![
            ChatMessage::user("one"),
            ChatMessage::model("reply one"),
            ChatMessage::user("two"),
            ChatMessage::failure("Error: boom"),
            ChatMessage::user("three"),
            ChatMessage::model(""),
            ChatMessage::user("four"),
            ChatMessage::model("reply four"),
        ];
        assert_eq!(
            texts(&conversation_history(&transcript)),
            vec!["one", "reply one", "four", "reply four"]
        );
    }

    #[test]
    fn history_keeps_clean_transcript() {
        let transcript = vec![ChatMessage::user("hi"), ChatMessage::model("hello")];
        assert_eq!(conversation_history(&transcript), transcript);
    }

    #[test]
    fn terminal_phases() {
        assert!(JobPhase::Ready.is_terminal());
        assert!(JobPhase::NoAsset.is_terminal());
        assert!(JobPhase::Failed("x".into()).is_terminal());
        assert!(!JobPhase::Polling { checks: 3 }.is_terminal());
    }

    #[test]
    fn video_asset_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let asset = VideoAsset {
            bytes: vec![0, 1, 2],
            mime_type: VIDEO_MIME.into(),
        };
        let path = asset.save_to(&dir.path().join("videos")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 1, 2]);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp4"));
    }
}
