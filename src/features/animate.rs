use super::FormError;
use crate::ai::{GenerationError, Operation, VideoRequest};
use crate::app::{Command, Effect, ImageTarget};
use crate::types::{AspectRatio, DataUri, ImageInput};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PROMPT: &str = "The person in the image slowly starts to smile, and the background subtly animates with sparkling lights.";

/// Status lines cycled while a video renders.
pub const LOADING_MESSAGE_KEYS: [&str; 5] = [
    "animate.loading1",
    "animate.loading2",
    "animate.loading3",
    "animate.loading4",
    "animate.loading5",
];

pub const LOADING_ROTATION: Duration = Duration::from_secs(4);

#[derive(Clone, Debug)]
pub enum AnimateCommand {
    SetKeyInput(String),
    SelectKey,
    KeySelected(Result<(), String>),
    LoadFile(PathBuf),
    ImageLoaded(Result<ImageInput, String>),
    SetPrompt(String),
    SetAspectRatio(AspectRatio),
    Generate,
    /// Rotation timer for job number `job`.
    Tick(u64),
    Finished(Result<PathBuf, GenerationError>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimateState {
    /// Whether a credential has been confirmed for video requests.
    pub key_selected: bool,
    pub key_input: String,
    pub image: Option<ImageInput>,
    pub preview: Option<DataUri>,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub loading: bool,
    pub loading_index: usize,
    pub error: Option<String>,
    pub video: Option<PathBuf>,
    job: u64,
}

impl AnimateState {
    pub fn new(key_selected: bool) -> Self {
        Self {
            key_selected,
            key_input: String::new(),
            image: None,
            preview: None,
            prompt: DEFAULT_PROMPT.to_string(),
            aspect_ratio: AspectRatio::default(),
            loading: false,
            loading_index: 0,
            error: None,
            video: None,
            job: 0,
        }
    }

    pub fn loading_message_key(&self) -> &'static str {
        LOADING_MESSAGE_KEYS[self.loading_index % LOADING_MESSAGE_KEYS.len()]
    }

    fn tick(&self) -> Effect {
        Effect::schedule(
            LOADING_ROTATION,
            Command::Animate(AnimateCommand::Tick(self.job)),
        )
    }

    pub fn handle(&mut self, command: AnimateCommand) -> Vec<Effect> {
        match command {
            AnimateCommand::SetKeyInput(key) => {
                self.key_input = key;
                vec![]
            }
            AnimateCommand::SelectKey => {
                let key = self.key_input.trim().to_string();
                if key.is_empty() {
                    self.error = Some(FormError::MissingApiKey.to_string());
                    return vec![];
                }
                vec![Effect::SelectApiKey(key)]
            }
            AnimateCommand::KeySelected(Ok(())) => {
                tracing::info!("video API key confirmed");
                self.key_selected = true;
                self.key_input.clear();
                self.error = None;
                vec![]
            }
            AnimateCommand::KeySelected(Err(reason)) => {
                self.error = Some(reason);
                vec![]
            }
            AnimateCommand::LoadFile(path) => vec![Effect::LoadImage {
                path,
                target: ImageTarget::Animate,
            }],
            AnimateCommand::ImageLoaded(Ok(image)) => {
                self.preview = Some(image.to_data_uri());
                self.image = Some(image);
                self.video = None;
                self.error = None;
                vec![]
            }
            AnimateCommand::ImageLoaded(Err(reason)) => {
                self.error = Some(reason);
                vec![]
            }
            AnimateCommand::SetPrompt(prompt) => {
                self.prompt = prompt;
                vec![]
            }
            AnimateCommand::SetAspectRatio(ratio) => {
                self.aspect_ratio = ratio;
                vec![]
            }
            AnimateCommand::Generate => {
                if self.loading || !self.key_selected {
                    return vec![];
                }
                let Some(image) = self.image.clone() else {
                    self.error = Some("Please upload an image to animate.".to_string());
                    return vec![];
                };
                self.loading = true;
                self.loading_index = 0;
                self.error = None;
                self.video = None;
                self.job += 1;
                vec![
                    Effect::AnimateImage(VideoRequest {
                        image,
                        prompt: Some(self.prompt.clone()),
                        aspect_ratio: self.aspect_ratio,
                    }),
                    self.tick(),
                ]
            }
            AnimateCommand::Tick(job) => {
                if !self.loading || job != self.job {
                    return vec![];
                }
                self.loading_index = (self.loading_index + 1) % LOADING_MESSAGE_KEYS.len();
                vec![self.tick()]
            }
            AnimateCommand::Finished(result) => {
                self.loading = false;
                match result {
                    Ok(path) => self.video = Some(path),
                    Err(err) => {
                        if err.is_invalid_credential() {
                            self.key_selected = false;
                        }
                        self.error = Some(err.user_message(Operation::AnimateImage));
                    }
                }
                vec![]
            }
        }
    }
}
