/// Upstream text that means the selected API key no longer resolves.
pub const INVALID_CREDENTIAL_SIGNATURE: &str = "Requested entity was not found";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Transport(String),

    #[error("{message} (HTTP {status})")]
    Upstream { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("the model returned no images")]
    EmptyResult,

    #[error("the response contained no image part")]
    NoImagePart,

    #[error("Video generation finished but no download link was provided.")]
    NoVideoLink,

    #[error("{0}")]
    InvalidCredential(String),

    #[error("Failed to download video: {0}")]
    Download(String),

    #[error("No API key configured. Set GEMINI_API_KEY or select a key.")]
    MissingApiKey,
}

pub type GenerationResult<T> = Result<T, GenerationError>;

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Malformed(err.to_string())
    }
}

/// The user action a failure is reported against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    GenerateImage,
    EditImage,
    RemoveBackground,
    Chat,
    AnimateImage,
}

impl Operation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Operation::GenerateImage => "Failed to generate image",
            Operation::EditImage => "Failed to edit image",
            Operation::RemoveBackground => "Failed to remove background",
            Operation::Chat => "Error",
            Operation::AnimateImage => "Failed to generate video",
        }
    }
}

impl GenerationError {
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, GenerationError::InvalidCredential(_))
    }

    /// Maps errors carrying the credential signature onto `InvalidCredential`.
    pub fn classify_credential(self) -> Self {
        if !self.is_invalid_credential() && self.to_string().contains(INVALID_CREDENTIAL_SIGNATURE) {
            return GenerationError::InvalidCredential(self.to_string());
        }
        self
    }

    /// Human-readable text shown inline or substituted into a transcript.
    pub fn user_message(&self, operation: Operation) -> String {
        match (self, operation) {
            (GenerationError::Validation(message), _) => message.clone(),
            (GenerationError::EmptyResult, _) => {
                "No image was generated. Please try a different prompt.".to_string()
            }
            (GenerationError::NoImagePart, Operation::RemoveBackground) => {
                "Could not remove background. The model may have been unable to perform the requested action.".to_string()
            }
            (GenerationError::NoImagePart, _) => {
                "Could not get edited image from response. The model may not have been able to perform the requested edit.".to_string()
            }
            (GenerationError::InvalidCredential(_), _) => {
                "API Key is invalid. Please select a valid API key and try again.".to_string()
            }
            (other, operation) => format!("{}: {}", operation.failure_prefix(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_image_part_messages_differ_from_transport() {
        let no_part = GenerationError::NoImagePart.user_message(Operation::EditImage);
        let transport =
            GenerationError::Transport("connection reset".into()).user_message(Operation::EditImage);
        assert!(no_part.starts_with("Could not get edited image"));
        assert_eq!(transport, "Failed to edit image: connection reset");
    }

    #[test]
    fn credential_signature_is_classified() {
        let err = GenerationError::Upstream {
            status: 404,
            message: "Requested entity was not found.".into(),
        }
        .classify_credential();
        assert!(err.is_invalid_credential());
        assert_eq!(
            err.user_message(Operation::AnimateImage),
            "API Key is invalid. Please select a valid API key and try again."
        );

        let other = GenerationError::Transport("timeout".into()).classify_credential();
        assert!(!other.is_invalid_credential());
    }

    #[test]
    fn missing_video_link_is_reported_under_video_prefix() {
        assert_eq!(
            GenerationError::NoVideoLink.user_message(Operation::AnimateImage),
            "Failed to generate video: Video generation finished but no download link was provided."
        );
    }

    #[test]
    fn chat_errors_read_like_a_reply() {
        assert_eq!(
            GenerationError::Transport("boom".into()).user_message(Operation::Chat),
            "Error: boom"
        );
    }
}
