use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One record of tabular data: column name → cell value, in wire order.
pub type Row = Map<String, Value>;

/// Shown in place of a response that has not been produced yet.
pub const NO_RESPONSE: &str = "No Response";
/// Shown in place of a response whose shape matches none of the known variants.
pub const UNSUPPORTED_RESPONSE: &str = "Response has unsupported data type";

/// A titled conversation with its prompt history and attached files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Chronological: insertion order is the order prompts were sent.
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

impl Conversation {
    pub fn prompt_mut(&mut self, prompt_id: i64) -> Option<&mut Prompt> {
        self.prompts.iter_mut().find(|p| p.id == prompt_id)
    }

    pub fn file_mut(&mut self, file_id: i64) -> Option<&mut UploadedFile> {
        self.files.iter_mut().find(|f| f.id == file_id)
    }

    /// Files flagged active that carry parsed rows.
    pub fn display_files(&self) -> impl Iterator<Item = &UploadedFile> {
        self.files.iter().filter(|f| f.has_display_data())
    }
}

/// One user message plus the server's response and an optional rating.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prompt {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub response: Option<PromptResponse>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The three response shapes the server produces.
///
/// The wire format carries no tag: a response is `{"text": ...}`, `{"data": [...]}`
/// or `{"json": {...}}`. Deserialization runs [`PromptResponse::classify`] once, so
/// the rest of the client matches on an explicit variant instead of re-probing shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResponse {
    Text(String),
    Data(Vec<Row>),
    Json(Value),
    /// Kept verbatim so it still round-trips; rendered as [`UNSUPPORTED_RESPONSE`].
    Unsupported(Value),
}

impl PromptResponse {
    /// Classify a raw response value. First match wins: a string `text` field,
    /// then an array `data` field, then a non-null object `json` field.
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return PromptResponse::Unsupported(value);
        };

        if matches!(fields.get("text"), Some(Value::String(_))) {
            if let Some(Value::String(text)) = fields.remove("text") {
                return PromptResponse::Text(text);
            }
        }

        if let Some(Value::Array(items)) = fields.get("data") {
            // Non-object entries cannot be laid out as table rows.
            if items.iter().all(Value::is_object) {
                if let Some(Value::Array(items)) = fields.remove("data") {
                    let rows = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(row) => Some(row),
                            _ => None,
                        })
                        .collect();
                    return PromptResponse::Data(rows);
                }
            }
        }

        if let Some(json @ (Value::Object(_) | Value::Array(_))) = fields.get("json") {
            let json = json.clone();
            return PromptResponse::Json(json);
        }

        PromptResponse::Unsupported(Value::Object(fields))
    }

    /// Inverse of [`classify`](Self::classify): the untagged wire shape.
    pub fn to_value(&self) -> Value {
        match self {
            PromptResponse::Text(text) => serde_json::json!({ "text": text }),
            PromptResponse::Data(rows) => serde_json::json!({ "data": rows }),
            PromptResponse::Json(json) => serde_json::json!({ "json": json }),
            PromptResponse::Unsupported(raw) => raw.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PromptResponse::Text(_) => "text",
            PromptResponse::Data(_) => "data",
            PromptResponse::Json(_) => "json",
            PromptResponse::Unsupported(_) => "unsupported",
        }
    }
}

impl<'de> Deserialize<'de> for PromptResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(PromptResponse::classify)
    }
}

impl Serialize for PromptResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

/// A file the server parsed and attached to a conversation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub data: Option<FileData>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UploadedFile {
    /// Only active files with parsed rows are shown as tables.
    pub fn has_display_data(&self) -> bool {
        self.active && self.data.is_some()
    }

    pub fn rows(&self) -> &[Row] {
        self.data.as_ref().map(|d| d.data.as_slice()).unwrap_or(&[])
    }
}

/// Parsed tabular payload of an uploaded file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FileData {
    #[serde(default)]
    pub data: Vec<Row>,
}

/// Partial update for an uploaded file. Absent fields are left untouched
/// both on the wire and when merged locally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FilePatch {
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Default::default()
        }
    }

    pub fn apply(&self, file: &mut UploadedFile) {
        if let Some(active) = self.active {
            file.active = active;
        }
        if let Some(ref filename) = self.filename {
            file.filename = filename.clone();
        }
    }
}

/// A prompt rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Request body for `POST /conversations/{id}/chat`.
#[derive(Serialize, Debug)]
pub(crate) struct ChatRequest<'a> {
    pub prompt_chat: &'a str,
}

/// Request body for the rating endpoint.
#[derive(Serialize, Debug)]
pub(crate) struct RatingRequest {
    pub rating: u8,
}
