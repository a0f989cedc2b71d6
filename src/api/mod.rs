//! # File Chat API
//!
//! Wire types and the HTTP backend for the file chat server. Nothing in here
//! knows about the terminal; the TUI drives these calls through `core`.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::{
    ACCEPTED_EXTENSIONS, BackendError, ChatBackend, UploadSource, is_accepted_upload,
};
pub use client::HttpBackend;
pub use types::{
    Conversation, FileData, FilePatch, NO_RESPONSE, Prompt, PromptResponse, Rating, Row,
    UNSUPPORTED_RESPONSE, UploadedFile,
};
