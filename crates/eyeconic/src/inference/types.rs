//! Wire types for OpenAI-compatible chat-completion APIs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Persona and capability statement sent with every request.
pub const SYSTEM_PROMPT: &str = "You are Eyeconic, an AI assistant and advisor. Always introduce yourself as 'I am Eyeconic, your AI assistant and advisor' when asked about your identity. You can analyze images and respond to questions about them.";

/// Detail level requested for image parts.
pub const IMAGE_DETAIL: &str = "high";

/// Hosted inference provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenRouter (default)
    #[default]
    OpenRouter,
    /// Google Gemini through its OpenAI-compatible endpoint
    Gemini,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// The one model used for both text-only and image requests.
    pub fn model(&self) -> &'static str {
        match self {
            Self::OpenRouter => "qwen/qwen2.5-vl-3b-instruct:free",
            Self::Gemini => "gemini-2.0-flash",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenRouter => write!(f, "openrouter"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "gemini" => Ok(Self::Gemini),
            _ => Err(format!("Unknown inference provider: {}", s)),
        }
    }
}

/// What the relay asks the model: a prompt and optionally one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionInput {
    pub prompt: String,
    /// `data:image/jpeg;base64,...` URL
    pub image_data_url: Option<String>,
}

impl CompletionInput {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_data_url: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_data_url: Some(image_data_url.into()),
        }
    }

    pub fn is_multimodal(&self) -> bool {
        self.image_data_url.is_some()
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    /// System persona followed by the user turn.
    pub fn new(model: impl Into<String>, input: &CompletionInput) -> Self {
        let user_content = match &input.image_data_url {
            Some(url) => MessageContent::Parts(vec![
                ContentPart::Text {
                    text: input.prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: url.clone(),
                        detail: IMAGE_DETAIL.to_string(),
                    },
                },
            ]),
            None => MessageContent::Text(input.prompt.clone()),
        };

        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: Role::User,
                    content: user_content,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// Plain string for text-only turns, typed parts for multimodal ones.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: String,
}

/// Chat-completion response body (only the fields the relay reads).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
    /// Some gateways report upstream failures inside a 200 body.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any.
    pub fn reply_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Error envelope returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
