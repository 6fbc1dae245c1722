use crate::ai::{GenerationResult, Operation};
use crate::app::{Effect, ImageTarget};
use crate::types::{DataUri, ImageInput};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub enum EditorCommand {
    LoadFile(PathBuf),
    ImageLoaded(Result<ImageInput, String>),
    SetPrompt(String),
    Apply,
    Applied(GenerationResult<DataUri>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    pub prompt: String,
    pub image: Option<ImageInput>,
    pub preview: Option<DataUri>,
    pub result: Option<DataUri>,
    pub loading: bool,
    pub error: Option<String>,
}

impl EditorState {
    pub fn handle(&mut self, command: EditorCommand) -> Vec<Effect> {
        match command {
            EditorCommand::LoadFile(path) => vec![Effect::LoadImage {
                path,
                target: ImageTarget::Editor,
            }],
            EditorCommand::ImageLoaded(Ok(image)) => {
                self.preview = Some(image.to_data_uri());
                self.image = Some(image);
                self.result = None;
                self.error = None;
                vec![]
            }
            EditorCommand::ImageLoaded(Err(reason)) => {
                self.error = Some(reason);
                vec![]
            }
            EditorCommand::SetPrompt(prompt) => {
                self.prompt = prompt;
                vec![]
            }
            EditorCommand::Apply => {
                if self.loading {
                    return vec![];
                }
                let image = match &self.image {
                    Some(image) if !self.prompt.trim().is_empty() => image.clone(),
                    _ => {
                        self.error = Some("Please upload an image and enter a prompt.".to_string());
                        return vec![];
                    }
                };
                self.loading = true;
                self.error = None;
                self.result = None;
                vec![Effect::EditImage {
                    image,
                    instruction: self.prompt.clone(),
                }]
            }
            EditorCommand::Applied(result) => {
                self.loading = false;
                match result {
                    Ok(image) => self.result = Some(image),
                    Err(err) => self.error = Some(err.user_message(Operation::EditImage)),
                }
                vec![]
            }
        }
    }
}
