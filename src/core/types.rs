//! Shared request/response types
//!
//! These are the only values that cross the provider contract boundary. No
//! wire format is defined here; transport and serialization belong to the
//! surrounding platform.

use serde::{Deserialize, Serialize};

/// Per-call generation tuning
///
/// Created per call and treated as immutable. Serializable so the cost
/// estimator can include it in its character count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Maximum completion tokens
    pub max_tokens: Option<u32>,

    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// Token accounting for a single generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Why a generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of output or a stop sequence
    Stop,
    /// Token limit reached
    Length,
    /// The model invoked a tool
    ToolUse,
    /// Backend-reported error mid-stream
    Error,
}

/// Provider output for a single call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    /// Generated text
    pub content: String,

    /// Token usage reported by the backend
    pub usage: TokenUsage,

    /// Why generation stopped
    pub finish_reason: FinishReason,
}

/// Static capability descriptor declared by a provider
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// Accepts image input
    pub vision: bool,

    /// Can stream partial output
    pub streaming: bool,

    /// Supports tool/function calling
    pub tool_calling: bool,

    /// Maximum completion tokens the backend accepts
    pub max_tokens: u32,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            vision: false,
            streaming: false,
            tool_calling: false,
            max_tokens: 4096,
        }
    }
}

/// Caller-side capability requirements for a request
///
/// Unrequested capabilities contribute nothing to scoring, so the default
/// (nothing required) matches plain text generation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CapabilityRequest {
    /// Request needs image input
    pub vision: bool,

    /// Request wants streamed output
    pub streaming: bool,

    /// Request needs tool calling
    pub tool_calling: bool,
}

impl CapabilityRequest {
    /// Requirements for plain text generation
    pub fn none() -> Self {
        Self::default()
    }
}
