//! Integration tests for the generation pipeline
//!
//! A scripted backend stands in for the hosted API so the orchestrator, the
//! feature state machines and the effect runtime can be driven end to end.

use async_trait::async_trait;
use dreamcanvas::ai::{
    ChatTier, GenerationError, GenerationResult, GenerativeBackend, InlineImage, JobPhase,
    Operation, Orchestrator, TextStream, VideoOperation, VideoRequest,
};
use dreamcanvas::app::{AppState, Command, Effect, Runtime};
use dreamcanvas::features::animate::AnimateCommand;
use dreamcanvas::features::chat::ChatCommand;
use dreamcanvas::features::history::HISTORY_LIMIT;
use dreamcanvas::features::studio::StudioCommand;
use dreamcanvas::storage::{Persistence, StorageKey};
use dreamcanvas::types::{AspectRatio, ChatMessage, ImageInput, Role};
use futures::StreamExt;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

#[derive(Default)]
struct ScriptedBackend {
    images: Mutex<VecDeque<GenerationResult<Vec<InlineImage>>>>,
    chunks: Vec<&'static str>,
    polls_until_done: usize,
    video_uri: Option<String>,
    submit_error: Option<GenerationError>,
    histories: Mutex<Vec<Vec<ChatMessage>>>,
    polls: AtomicUsize,
    downloads: AtomicUsize,
}

impl ScriptedBackend {
    fn with_images(images: Vec<GenerationResult<Vec<InlineImage>>>) -> Self {
        Self {
            images: Mutex::new(images.into()),
            ..Self::default()
        }
    }
}

fn inline(data: &str) -> InlineImage {
    InlineImage {
        mime_type: "image/png".to_string(),
        data: data.to_string(),
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_images(&self, _prompt: &str) -> GenerationResult<Vec<InlineImage>> {
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn edit_image(
        &self,
        _image: &ImageInput,
        instruction: &str,
    ) -> GenerationResult<Option<InlineImage>> {
        Ok((!instruction.contains("nothing")).then(|| inline("edited")))
    }

    async fn chat(
        &self,
        _tier: ChatTier,
        history: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<String> {
        self.histories.lock().unwrap().push(history.to_vec());
        Ok(format!("echo: {text}"))
    }

    async fn chat_stream(
        &self,
        _tier: ChatTier,
        history: &[ChatMessage],
        _text: &str,
    ) -> GenerationResult<TextStream> {
        self.histories.lock().unwrap().push(history.to_vec());
        let chunks: Vec<GenerationResult<String>> =
            self.chunks.iter().map(|chunk| Ok(chunk.to_string())).collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn submit_video(&self, _request: &VideoRequest) -> GenerationResult<VideoOperation> {
        if let Some(err) = self.submit_error.clone() {
            return Err(err);
        }
        Ok(VideoOperation {
            name: "operations/test".to_string(),
            ..VideoOperation::default()
        })
    }

    async fn poll_video(&self, operation: &VideoOperation) -> GenerationResult<VideoOperation> {
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let done = polls >= self.polls_until_done;
        Ok(VideoOperation {
            done,
            video_uri: if done { self.video_uri.clone() } else { None },
            ..operation.clone()
        })
    }

    async fn download_video(&self, _uri: &str) -> GenerationResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(b"mp4".to_vec())
    }
}

fn orchestrator(backend: Arc<ScriptedBackend>) -> Orchestrator {
    Orchestrator::new(backend, Duration::ZERO)
}

fn video_request() -> VideoRequest {
    VideoRequest {
        image: ImageInput::new(vec![1, 2, 3], "image/png"),
        prompt: Some("   ".to_string()),
        aspect_ratio: AspectRatio::Portrait,
    }
}

mod image_tests {
    use super::*;

    #[tokio::test]
    async fn test_generated_images_feed_a_capped_deduplicated_history() {
        let mut images: Vec<GenerationResult<Vec<InlineImage>>> = (0..HISTORY_LIMIT + 5)
            .map(|i| Ok(vec![inline(&format!("img{i}"))]))
            .collect();
        images.push(Ok(vec![inline("img60")]));
        let backend = Arc::new(ScriptedBackend::with_images(images));
        let orchestrator = orchestrator(backend);

        let mut app = AppState::load(&Persistence::in_memory(), false);
        for _ in 0..HISTORY_LIMIT + 6 {
            app.update(Command::Studio(StudioCommand::Generate));
            let image = orchestrator.generate_image(&app.studio.prompt).await;
            app.update(Command::Studio(StudioCommand::Generated(image)));
        }

        let history = &app.studio.history;
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0].as_str(), "data:image/jpeg;base64,img60");
        assert_eq!(app.studio.image.as_ref(), Some(&history.entries()[0]));
        let unique: HashSet<_> = history.entries().iter().collect();
        assert_eq!(unique.len(), HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn test_empty_generation_is_reported() {
        let backend = Arc::new(ScriptedBackend::with_images(vec![Ok(Vec::new())]));
        let err = orchestrator(backend).generate_image("a cat").await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyResult);
        assert_eq!(
            err.user_message(Operation::GenerateImage),
            "No image was generated. Please try a different prompt."
        );
    }

    #[tokio::test]
    async fn test_edit_without_image_part_is_an_error() {
        let orchestrator = orchestrator(Arc::new(ScriptedBackend::default()));
        let image = ImageInput::new(vec![9], "image/png");
        let edited = orchestrator.edit_image(Some(&image), "add a hat").await.unwrap();
        assert_eq!(edited.as_str(), "data:image/png;base64,edited");

        let err = orchestrator.edit_image(Some(&image), "do nothing").await.unwrap_err();
        assert_eq!(err, GenerationError::NoImagePart);
        let err = orchestrator.edit_image(None, "add a hat").await.unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
    }
}

mod chat_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_alternates_and_skips_failed_turns() {
        let backend = Arc::new(ScriptedBackend::default());
        let orchestrator = orchestrator(backend.clone());
        let transcript = vec![
            ChatMessage::user("first"),
            ChatMessage::model("answer"),
            ChatMessage::user("second"),
            ChatMessage::failure("Error: offline"),
        ];

        let reply = orchestrator
            .chat_turn(ChatTier::Complex, &transcript, "third")
            .await
            .unwrap();
        assert_eq!(reply, "echo: third");

        let sent = backend.histories.lock().unwrap()[0].clone();
        let roles: Vec<Role> = sent.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model]);
        assert!(sent.iter().all(|m| !m.failed));
    }

    #[tokio::test]
    async fn test_stream_partials_only_grow() {
        let backend = Arc::new(ScriptedBackend {
            chunks: vec!["Hel", "", "lo", " world"],
            ..ScriptedBackend::default()
        });
        let orchestrator = orchestrator(backend);
        let mut seen: Vec<String> = Vec::new();
        let full = orchestrator
            .chat_turn_stream(ChatTier::Fast, &[], "hi", |so_far: &str| {
                seen.push(so_far.to_string())
            })
            .await
            .unwrap();

        assert_eq!(full, "Hello world");
        assert_eq!(seen, vec!["Hel", "Hello", "Hello world"]);
        for pair in seen.windows(2) {
            assert!(pair[1].starts_with(&pair[0]) && pair[1].len() > pair[0].len());
        }
    }

    #[tokio::test]
    async fn test_streamed_reply_lands_in_the_placeholder() {
        let backend = Arc::new(ScriptedBackend {
            chunks: vec!["4"],
            ..ScriptedBackend::default()
        });
        let persistence = Persistence::in_memory();
        let runtime = Runtime::new(orchestrator(backend), persistence.clone(), std::env::temp_dir());
        let mut app = AppState::load(&persistence, false);

        app.update(Command::Chat(ChatTier::Fast, ChatCommand::SetInput("2+2".into())));
        let effects = app.update(Command::Chat(ChatTier::Fast, ChatCommand::Send));
        let (tx, mut rx) = unbounded_channel();
        for effect in effects {
            runtime.execute(effect, tx.clone()).await;
        }
        drop(tx);
        while let Some(command) = rx.recv().await {
            app.update(command);
        }

        let transcript = &app.fast_chat.transcript;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text, "4");
        assert!(!app.fast_chat.sending);
        let stored: Vec<ChatMessage> = persistence.load(StorageKey::FastChat);
        assert_eq!(stored.len(), 2);
    }
}

mod video_tests {
    use super::*;

    #[tokio::test]
    async fn test_polls_until_done_then_downloads_once() {
        let backend = Arc::new(ScriptedBackend {
            polls_until_done: 3,
            video_uri: Some("https://example.invalid/video".to_string()),
            ..ScriptedBackend::default()
        });
        let orchestrator = orchestrator(backend.clone());
        let mut phases = Vec::new();
        let asset = orchestrator
            .animate_image_observed(&video_request(), |phase: &JobPhase| phases.push(phase.clone()))
            .await
            .unwrap();

        assert_eq!(asset.bytes, b"mp4");
        assert_eq!(backend.polls.load(Ordering::SeqCst), 3);
        assert_eq!(backend.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(phases.first(), Some(&JobPhase::Submitted));
        assert_eq!(phases.last(), Some(&JobPhase::Ready));
        assert!(phases.contains(&JobPhase::Polling { checks: 2 }));
    }

    #[tokio::test]
    async fn test_missing_link_skips_download() {
        let backend = Arc::new(ScriptedBackend {
            polls_until_done: 1,
            ..ScriptedBackend::default()
        });
        let err = orchestrator(backend.clone())
            .animate_image(&video_request())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::NoVideoLink);
        assert_eq!(backend.downloads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_entity_means_invalid_credential() {
        let backend = Arc::new(ScriptedBackend {
            submit_error: Some(GenerationError::Upstream {
                status: 404,
                message: "Requested entity was not found.".to_string(),
            }),
            ..ScriptedBackend::default()
        });
        let persistence = Persistence::in_memory();
        let dir = tempfile::tempdir().expect("tempdir");
        let runtime = Runtime::new(orchestrator(backend), persistence.clone(), dir.path().to_path_buf());

        let mut app = AppState::load(&persistence, true);
        app.update(Command::Animate(AnimateCommand::ImageLoaded(Ok(ImageInput::new(
            vec![1],
            "image/png",
        )))));
        let effects = app.update(Command::Animate(AnimateCommand::Generate));
        let (tx, mut rx) = unbounded_channel();
        for effect in effects {
            if matches!(effect, Effect::AnimateImage(_)) {
                runtime.execute(effect, tx.clone()).await;
            }
        }
        drop(tx);
        while let Some(command) = rx.recv().await {
            app.update(command);
        }

        assert!(!app.animate.key_selected);
        assert!(!app.animate.loading);
        assert_eq!(
            app.animate.error.as_deref(),
            Some("API Key is invalid. Please select a valid API key and try again.")
        );
    }

    #[tokio::test]
    async fn test_finished_video_is_written_to_disk() {
        let backend = Arc::new(ScriptedBackend {
            polls_until_done: 1,
            video_uri: Some("https://example.invalid/video".to_string()),
            ..ScriptedBackend::default()
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let asset = orchestrator(backend).animate_image(&video_request()).await.unwrap();
        let path = asset.save_to(dir.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"mp4");
    }
}
