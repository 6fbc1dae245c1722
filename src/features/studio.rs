use super::history::ImageHistory;
use crate::ai::{GenerationResult, Operation};
use crate::app::{Effect, Snapshot};
use crate::types::DataUri;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "A high-resolution photo of a futuristic city skyline at dusk, with flying cars and neon lights, cinematic lighting.";

#[derive(Clone, Debug)]
pub enum StudioCommand {
    SetPrompt(String),
    Generate,
    Generated(GenerationResult<DataUri>),
    RemoveBackground,
    BackgroundRemoved(GenerationResult<DataUri>),
    DeleteCurrent,
    DeleteBackgroundRemoved,
    SelectFromHistory(DataUri),
    DeleteFromHistory(DataUri),
    ClearHistory,
    Download { image: DataUri, path: PathBuf },
    Downloaded(Result<PathBuf, String>),
}

/// The image generation screen.
#[derive(Clone, Debug, PartialEq)]
pub struct StudioState {
    pub prompt: String,
    pub image: Option<DataUri>,
    pub loading: bool,
    pub error: Option<String>,
    pub removing_background: bool,
    pub background_removed: Option<DataUri>,
    pub background_error: Option<String>,
    pub history: ImageHistory,
    /// Outcome of the last download.
    pub notice: Option<String>,
}

impl StudioState {
    pub fn new(history: ImageHistory) -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            image: None,
            loading: false,
            error: None,
            removing_background: false,
            background_removed: None,
            background_error: None,
            history,
            notice: None,
        }
    }

    pub fn busy(&self) -> bool {
        self.loading || self.removing_background
    }

    fn save_history(&self) -> Effect {
        Effect::Save(Snapshot::ImageHistory(self.history.clone()))
    }

    fn clear_background(&mut self) {
        self.background_removed = None;
        self.background_error = None;
    }

    pub fn handle(&mut self, command: StudioCommand) -> Vec<Effect> {
        match command {
            StudioCommand::SetPrompt(prompt) => {
                self.prompt = prompt;
                vec![]
            }
            StudioCommand::Generate => {
                if self.busy() {
                    return vec![];
                }
                if self.prompt.trim().is_empty() {
                    self.error = Some("Please enter a prompt.".to_string());
                    return vec![];
                }
                self.loading = true;
                self.error = None;
                self.image = None;
                self.clear_background();
                vec![Effect::GenerateImage {
                    prompt: self.prompt.clone(),
                }]
            }
            StudioCommand::Generated(result) => {
                self.loading = false;
                match result {
                    Ok(image) => {
                        self.history.push(image.clone());
                        self.image = Some(image);
                        vec![self.save_history()]
                    }
                    Err(err) => {
                        self.error = Some(err.user_message(Operation::GenerateImage));
                        vec![]
                    }
                }
            }
            StudioCommand::RemoveBackground => {
                if self.busy() {
                    return vec![];
                }
                let Some(image) = self.image.clone() else {
                    self.background_error = Some("No generated image to process.".to_string());
                    return vec![];
                };
                self.removing_background = true;
                self.clear_background();
                vec![Effect::RemoveBackground { image }]
            }
            StudioCommand::BackgroundRemoved(result) => {
                self.removing_background = false;
                match result {
                    Ok(image) => self.background_removed = Some(image),
                    Err(err) => {
                        self.background_error = Some(err.user_message(Operation::RemoveBackground))
                    }
                }
                vec![]
            }
            StudioCommand::DeleteCurrent => {
                let removed = match self.image.take() {
                    Some(image) => self.history.remove(&image),
                    None => false,
                };
                self.clear_background();
                if removed { vec![self.save_history()] } else { vec![] }
            }
            StudioCommand::DeleteBackgroundRemoved => {
                self.background_removed = None;
                vec![]
            }
            StudioCommand::SelectFromHistory(image) => {
                self.image = Some(image);
                self.clear_background();
                vec![]
            }
            StudioCommand::DeleteFromHistory(image) => {
                if !self.history.remove(&image) {
                    return vec![];
                }
                if self.image.as_ref() == Some(&image) {
                    self.image = None;
                    self.clear_background();
                }
                vec![self.save_history()]
            }
            StudioCommand::ClearHistory => {
                self.history.clear();
                vec![self.save_history()]
            }
            StudioCommand::Download { image, path } => vec![Effect::WriteFile { path, image }],
            StudioCommand::Downloaded(result) => {
                self.notice = Some(match result {
                    Ok(path) => format!("Saved to {}", path.display()),
                    Err(reason) => format!("Could not save image: {reason}"),
                });
                vec![]
            }
        }
    }
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new(ImageHistory::new())
    }
}
