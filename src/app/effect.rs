use super::Command;
use crate::ai::{ChatTier, VideoRequest};
use crate::features::history::ImageHistory;
use crate::i18n::Language;
use crate::types::{AdminUser, ChatMessage, DataUri, ImageInput};
use std::path::PathBuf;
use std::time::Duration;

/// Which screen asked for an image file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageTarget {
    Editor,
    Animate,
}

/// Work requested by a state transition, performed by the runtime.
#[derive(Clone, Debug)]
pub enum Effect {
    GenerateImage {
        prompt: String,
    },
    RemoveBackground {
        image: DataUri,
    },
    EditImage {
        image: ImageInput,
        instruction: String,
    },
    /// `transcript` holds the turns before `text`.
    Chat {
        tier: ChatTier,
        transcript: Vec<ChatMessage>,
        text: String,
    },
    AnimateImage(VideoRequest),
    SelectApiKey(String),
    LoadImage {
        path: PathBuf,
        target: ImageTarget,
    },
    WriteFile {
        path: PathBuf,
        image: DataUri,
    },
    CopyToClipboard(String),
    Save(Snapshot),
    Schedule {
        after: Duration,
        command: Box<Command>,
    },
}

impl Effect {
    pub fn schedule(after: Duration, command: Command) -> Self {
        Effect::Schedule {
            after,
            command: Box::new(command),
        }
    }
}

/// A whole value to mirror into storage.
#[derive(Clone, Debug, PartialEq)]
pub enum Snapshot {
    Transcript(ChatTier, Vec<ChatMessage>),
    ImageHistory(ImageHistory),
    AdminUsers(Vec<AdminUser>),
    Language(Language),
}
