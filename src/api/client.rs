//! HTTP implementation of [`ChatBackend`] for the file chat server.
//!
//! ```text
//! GET  /conversations                  → [Conversation]
//! POST /conversations/upload           multipart: files*, title?  → Conversation
//! POST /conversations/{id}/chat        {"prompt_chat": ...}       → Prompt
//! PUT  /prompts/{id}/rating            {"rating": 1..5}
//! PUT  /files/{id}                     partial file fields
//! ```

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use super::backend::{BackendError, ChatBackend, UploadSource};
use super::types::{ChatRequest, Conversation, FilePatch, Prompt, Rating, RatingRequest};

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::Config(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        Ok(Self {
            base_url,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a prepared request and map transport and status failures.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("{} response status: {}", self.name(), response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("File chat API error: {} - {}", status, err_body);
            return Err(BackendError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        debug!("GET /conversations");
        let conversations: Vec<Conversation> = self
            .execute_json(self.client.get(self.url("/conversations")))
            .await?;
        info!("Fetched {} conversations", conversations.len());
        Ok(conversations)
    }

    async fn upload_files(
        &self,
        files: &[UploadSource],
        title: Option<&str>,
    ) -> Result<Conversation, BackendError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.filename.clone())
                .mime_str(file.mime_type())
                .map_err(|e| BackendError::Config(e.to_string()))?;
            form = form.part("files", part);
        }
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            form = form.text("title", title.to_string());
        }

        info!(
            "POST /conversations/upload: {} files, title={:?}",
            files.len(),
            title
        );
        let request = self
            .client
            .post(self.url("/conversations/upload"))
            .multipart(form);
        let conversation: Conversation = self.execute_json(request).await?;
        info!("Upload created conversation {}", conversation.id);
        Ok(conversation)
    }

    async fn send_chat(
        &self,
        conversation_id: i64,
        message: &str,
    ) -> Result<Prompt, BackendError> {
        debug!(
            "POST /conversations/{}/chat (len={})",
            conversation_id,
            message.len()
        );
        let request = self
            .client
            .post(self.url(&format!("/conversations/{conversation_id}/chat")))
            .json(&ChatRequest {
                prompt_chat: message,
            });
        let prompt: Prompt = self.execute_json(request).await?;
        info!(
            "Prompt {} created in conversation {} (response: {})",
            prompt.id,
            conversation_id,
            prompt.response.as_ref().map_or("none", |r| r.kind())
        );
        Ok(prompt)
    }

    async fn rate_prompt(&self, prompt_id: i64, rating: Rating) -> Result<(), BackendError> {
        debug!("PUT /prompts/{}/rating ({})", prompt_id, rating.get());
        let request = self
            .client
            .put(self.url(&format!("/prompts/{prompt_id}/rating")))
            .json(&RatingRequest {
                rating: rating.get(),
            });
        self.execute(request).await?;
        Ok(())
    }

    async fn update_file(&self, file_id: i64, patch: &FilePatch) -> Result<(), BackendError> {
        debug!("PUT /files/{} {:?}", file_id, patch);
        let request = self
            .client
            .put(self.url(&format!("/files/{file_id}")))
            .json(patch);
        self.execute(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/conversations"), "http://localhost:8000/conversations");
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let result = HttpBackend::new("localhost:8000");
        assert!(matches!(result, Err(BackendError::Config(_))));
    }
}
