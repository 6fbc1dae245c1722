//! Per-screen state machines.
//!
//! Every screen keeps its own state and reacts to its own command type. A
//! handler only mutates that state and describes the work it needs done as
//! [`Effect`](crate::app::Effect)s; it never touches the network, disk or clock.

pub mod admin;
pub mod animate;
pub mod chat;
pub mod editor;
pub mod history;
pub mod login;
pub mod pricing;
pub mod studio;

/// A form precondition that failed before anything was sent anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Name and email are required.")]
    NameAndEmailRequired,

    #[error("Please enter an API key.")]
    MissingApiKey,
}

impl FormError {
    /// Translation key for the message, when the UI has one.
    pub fn translation_key(self) -> Option<&'static str> {
        match self {
            FormError::MissingFields => Some("login.fillAllFields"),
            FormError::InvalidCredentials => Some("login.invalidCredentialsError"),
            FormError::NameAndEmailRequired => Some("admin.addUserModal.requiredError"),
            FormError::MissingApiKey => None,
        }
    }
}
