use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_PRO_CHAT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_FAST_CHAT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Runtime settings, read once from the environment at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub image_model: String,
    pub edit_model: String,
    pub pro_chat_model: String,
    pub fast_chat_model: String,
    pub video_model: String,
    pub poll_interval: Duration,
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            pro_chat_model: DEFAULT_PRO_CHAT_MODEL.to_string(),
            fast_chat_model: DEFAULT_FAST_CHAT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            data_dir: default_data_dir(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let poll_interval = match non_empty("DREAMCANVAS_POLL_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("DREAMCANVAS_POLL_INTERVAL_SECS must be a whole number, got {raw:?}")
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.poll_interval,
        };

        Ok(Self {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            api_base: non_empty("DREAMCANVAS_API_BASE").unwrap_or(defaults.api_base),
            image_model: non_empty("DREAMCANVAS_IMAGE_MODEL").unwrap_or(defaults.image_model),
            edit_model: non_empty("DREAMCANVAS_EDIT_MODEL").unwrap_or(defaults.edit_model),
            pro_chat_model: non_empty("DREAMCANVAS_PRO_CHAT_MODEL")
                .unwrap_or(defaults.pro_chat_model),
            fast_chat_model: non_empty("DREAMCANVAS_FAST_CHAT_MODEL")
                .unwrap_or(defaults.fast_chat_model),
            video_model: non_empty("DREAMCANVAS_VIDEO_MODEL").unwrap_or(defaults.video_model),
            poll_interval,
            data_dir: non_empty("DREAMCANVAS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    pub fn video_dir(&self) -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("dreamcanvas").join("videos"))
            .unwrap_or_else(|| self.data_dir.join("videos"))
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("dreamcanvas");
    }

    PathBuf::from("cache")
}
