use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrExport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_data: Vec<OcrPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrPage {
    /// Whatever the exporter put in `page`; numbers and strings are both seen.
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub words: Vec<OcrWord>,
}

impl OcrPage {
    /// Explicit page value as header text, or the page's zero-based position
    /// in the export. Strings are used verbatim, other values in JSON form.
    pub fn page_label(&self, index: usize) -> String {
        match &self.page {
            Some(Value::String(label)) => label.clone(),
            Some(value) => value.to_string(),
            None => index.to_string(),
        }
    }
}

/// One recognized word. Bounding-box fields other than the top-left corner
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OcrWord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub xmin: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ymin: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreparePaths {
    pub ocr_path: String,
    pub reassembled_path: String,
    pub chunks_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepareCounts {
    pub page_count: usize,
    pub empty_page_count: usize,
    pub word_count: usize,
    pub line_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepareRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub mode: String,
    pub started_at: String,
    pub updated_at: String,
    pub line_y_tolerance: f64,
    pub ocr_sha256: String,
    pub paths: PreparePaths,
    pub counts: PrepareCounts,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblePaths {
    pub chunks_path: String,
    pub summaries_path: String,
    pub dataset_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssembleCounts {
    pub chunk_count: usize,
    pub summary_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssembleRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub mode: String,
    pub started_at: String,
    pub updated_at: String,
    pub chunks_sha256: String,
    pub summaries_sha256: String,
    pub paths: AssemblePaths,
    pub counts: AssembleCounts,
    pub warnings: Vec<String>,
}
