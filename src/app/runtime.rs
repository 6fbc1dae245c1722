use super::{Command, Effect, ImageTarget, Snapshot};
use crate::ai::{GenerationError, Orchestrator};
use crate::clipboard;
use crate::features::animate::AnimateCommand;
use crate::features::chat::ChatCommand;
use crate::features::editor::EditorCommand;
use crate::features::studio::StudioCommand;
use crate::storage::{Persistence, StorageKey};
use crate::types::{DataUri, ImageInput};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;

/// Performs effects and reports their outcomes as commands.
#[derive(Clone)]
pub struct Runtime {
    orchestrator: Orchestrator,
    persistence: Persistence,
    video_dir: PathBuf,
}

impl Runtime {
    pub fn new(orchestrator: Orchestrator, persistence: Persistence, video_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            persistence,
            video_dir,
        }
    }

    pub async fn execute(&self, effect: Effect, tx: UnboundedSender<Command>) {
        let send = |command: Command| {
            deliver(&tx, command);
        };

        match effect {
            Effect::GenerateImage { prompt } => {
                let result = self.orchestrator.generate_image(&prompt).await;
                send(Command::Studio(StudioCommand::Generated(result)));
            }
            Effect::RemoveBackground { image } => {
                let result = self.orchestrator.remove_background(&image).await;
                send(Command::Studio(StudioCommand::BackgroundRemoved(result)));
            }
            Effect::EditImage { image, instruction } => {
                let result = self.orchestrator.edit_image(Some(&image), &instruction).await;
                send(Command::Editor(EditorCommand::Applied(result)));
            }
            Effect::Chat {
                tier,
                transcript,
                text,
            } => {
                let result = if tier.streams() {
                    let sink = |so_far: &str| {
                        send(Command::Chat(
                            tier,
                            ChatCommand::Partial(so_far.to_string()),
                        ))
                    };
                    self.orchestrator
                        .chat_turn_stream(tier, &transcript, &text, sink)
                        .await
                } else {
                    self.orchestrator.chat_turn(tier, &transcript, &text).await
                };
                send(Command::Chat(tier, ChatCommand::Replied(result)));
            }
            Effect::AnimateImage(request) => {
                let result = match self.orchestrator.animate_image(&request).await {
                    Ok(asset) => asset.save_to(&self.video_dir).map_err(|err| {
                        tracing::error!(%err, "could not store video");
                        GenerationError::Download(err.to_string())
                    }),
                    Err(err) => Err(err),
                };
                send(Command::Animate(AnimateCommand::Finished(result)));
            }
            Effect::SelectApiKey(key) => {
                self.orchestrator.set_api_key(Some(key));
                send(Command::Animate(AnimateCommand::KeySelected(Ok(()))));
            }
            Effect::LoadImage { path, target } => {
                let result = load_image(&path);
                send(match target {
                    ImageTarget::Editor => Command::Editor(EditorCommand::ImageLoaded(result)),
                    ImageTarget::Animate => Command::Animate(AnimateCommand::ImageLoaded(result)),
                });
            }
            Effect::WriteFile { path, image } => {
                let result = write_image(&path, &image).map(|()| path);
                send(Command::Studio(StudioCommand::Downloaded(result)));
            }
            Effect::CopyToClipboard(text) => {
                if let Err(err) = clipboard::copy_text(&text) {
                    tracing::warn!(%err, "copy failed");
                }
            }
            Effect::Save(snapshot) => self.save(snapshot),
            Effect::Schedule { after, command } => {
                tokio::time::sleep(after).await;
                send(*command);
            }
        }
    }

    fn save(&self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Transcript(tier, transcript) => {
                let key = if tier.streams() {
                    StorageKey::FastChat
                } else {
                    StorageKey::ComplexChat
                };
                self.persistence.save(key, &transcript);
            }
            Snapshot::ImageHistory(history) => {
                self.persistence.save(StorageKey::ImageHistory, &history)
            }
            Snapshot::AdminUsers(users) => self.persistence.save(StorageKey::AdminUsers, &users),
            Snapshot::Language(language) => self.persistence.save_language(language),
        }
    }
}

fn load_image(path: &Path) -> Result<ImageInput, String> {
    let image = ImageInput::from_path(path)
        .map_err(|err| format!("Could not read {}: {err}", path.display()))?;
    if !image.mime_type.starts_with("image/") {
        return Err(format!("{} is not an image file.", path.display()));
    }
    Ok(image)
}

fn write_image(path: &Path, image: &DataUri) -> Result<(), String> {
    let bytes = image
        .decode()
        .ok_or_else(|| "image data is not valid base64".to_string())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }
    std::fs::write(path, bytes).map_err(|err| {
        tracing::error!(path = %path.display(), %err, "download failed");
        err.to_string()
    })
}

/// Hands a result back to the update loop. Returns false once the loop is gone.
fn deliver(tx: &UnboundedSender<Command>, command: Command) -> bool {
    if tx.send(command).is_err() {
        tracing::debug!("command channel closed, dropping result");
        return false;
    }
    true
}
