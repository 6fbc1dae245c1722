pub mod ai;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod features;
pub mod i18n;
pub mod markdown;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(feature = "ui")]
pub mod ui;
#[cfg(feature = "ui")]
pub mod views;
