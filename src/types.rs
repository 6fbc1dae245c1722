use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    /// Error text standing in for a model reply. Never sent back as history.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            created_at: Some(OffsetDateTime::now_utc()),
            failed: false,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            created_at: Some(OffsetDateTime::now_utc()),
            failed: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            failed: true,
            ..Self::model(text)
        }
    }
}

/// An image encoded inline as `data:<mime>;base64,<payload>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataUri(String);

impl DataUri {
    pub fn from_base64(mime_type: &str, payload: &str) -> Self {
        Self(format!("data:{mime_type};base64,{payload}"))
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(mime_type, &BASE64.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime, _) = rest.split_once(';')?;
        Some(mime)
    }

    pub fn base64_payload(&self) -> Option<&str> {
        self.0.split_once(',').map(|(_, payload)| payload)
    }

    pub fn decode(&self) -> Option<Vec<u8>> {
        BASE64.decode(self.base64_payload()?).ok()
    }
}

impl From<String> for DataUri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary image supplied by the user, e.g. an uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self { bytes, mime_type })
    }

    pub fn from_data_uri(uri: &DataUri) -> Option<Self> {
        Some(Self {
            bytes: uri.decode()?,
            mime_type: uri.mime_type()?.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> DataUri {
        DataUri::from_bytes(&self.mime_type, &self.bytes)
    }

    pub fn base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 2] = [AspectRatio::Landscape, AspectRatio::Portrait];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Blocked,
            UserStatus::Blocked => UserStatus::Active,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserPlan {
    Free,
    Starter,
    Pro,
    Ultimate,
    Reseller,
}

impl UserPlan {
    /// Plans an admin may pick from a dropdown. Reseller is assigned, never chosen.
    pub const SELECTABLE: [UserPlan; 4] = [
        UserPlan::Free,
        UserPlan::Starter,
        UserPlan::Pro,
        UserPlan::Ultimate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserPlan::Free => "Free",
            UserPlan::Starter => "Starter",
            UserPlan::Pro => "Pro",
            UserPlan::Ultimate => "Ultimate",
            UserPlan::Reseller => "Reseller",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Free" => Some(UserPlan::Free),
            "Starter" => Some(UserPlan::Starter),
            "Pro" => Some(UserPlan::Pro),
            "Ultimate" => Some(UserPlan::Ultimate),
            "Reseller" => Some(UserPlan::Reseller),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub images_generated: u64,
    pub plan: UserPlan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_parts() {
        let uri = DataUri::from_bytes("image/png", b"abc");
        assert_eq!(uri.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(uri.mime_type(), Some("image/png"));
        assert_eq!(uri.base64_payload(), Some("YWJj"));
        assert_eq!(uri.decode(), Some(b"abc".to_vec()));
    }

    #[test]
    fn admin_user_uses_camel_case() {
        let user = AdminUser {
            id: 1,
            name: "Alice Johnson".into(),
            email: "alice@example.com".into(),
            status: UserStatus::Active,
            images_generated: 85,
            plan: UserPlan::Pro,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["imagesGenerated"], 85);
        assert_eq!(json["status"], "Active");
    }

    #[test]
    fn failed_flag_is_omitted_for_regular_messages() {
        let json = serde_json::to_value(ChatMessage::model("hi")).unwrap();
        assert!(json.get("failed").is_none());
        let back: ChatMessage =
            serde_json::from_str(r#"{"role":"model","text":"hi"}"#).unwrap();
        assert!(!back.failed);
        assert!(back.created_at.is_none());
    }
}
