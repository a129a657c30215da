pub mod app;
pub mod archive;
pub mod config;
pub mod credentials;
pub mod diary_entry;
pub mod diary_service;
pub mod emotion;
pub mod error;
pub mod image_upload;
pub mod multipart;
pub mod stats;
pub mod tasks;
pub mod transport;
pub mod ui;

pub use config::Config;
pub use credentials::{CredentialProvider, StaticToken, TokenStore};
pub use diary_entry::{DiaryEntry, NewDiaryEntry};
pub use diary_service::DiaryService;
pub use emotion::Emotion;
pub use error::{ServiceError, ServiceResult};
