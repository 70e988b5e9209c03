use serde::{Deserialize, Serialize};

// ---- api bodies ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePoemBody {
    pub theme: Option<String>,
    pub user_input: Option<String>,
    pub previous_lines: Option<Vec<String>>
}

/// A generation request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub theme: String,
    pub user_input: String,
    pub previous_lines: Vec<String>
}

/// Token counts derived from character length (chars / 4), not from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageEstimate {
    pub total_tokens: usize,
    pub prompt_tokens: usize,
    pub completion_tokens: usize
}

#[derive(Debug, Serialize)]
pub struct GeneratePoemResponse {
    pub success: bool,
    pub line: String,
    pub usage: UsageEstimate
}

#[derive(Debug, Deserialize)]
pub struct SavePoemBody {
    pub poem: Option<Vec<String>>,
    pub theme: Option<String>
}

#[derive(Debug, Serialize)]
pub struct SavePoemResponse {
    pub success: bool,
    pub filename: String,
    pub message: String
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub runtime_version: String,
    pub gemini_status: &'static str,
    pub ai_provider: String
}

// ---- gemini wire format ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorEnvelope {
    pub error: GeminiErrorBody
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<GeminiErrorDetail>
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>
}
