//! Exchange data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Client platform an exchange came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeSource {
    /// Structured JSON request (browser client)
    Web,
    /// Form or multipart request (mobile client)
    Mobile,
    #[default]
    Unknown,
}

impl fmt::Display for ExchangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => write!(f, "web"),
            Self::Mobile => write!(f, "mobile"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for ExchangeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "mobile" => Ok(Self::Mobile),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown exchange source: {}", s)),
        }
    }
}

/// One persisted prompt/response exchange.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exchange {
    /// Auto-incrementing ID
    pub id: i64,
    /// Prompt as sent by the client
    pub prompt: String,
    /// Media-relative path of the stored attachment
    pub image: Option<String>,
    /// Reply text from the inference API
    pub response: String,
    /// Client platform label
    pub source: String,
    /// RFC 3339 creation time (UTC)
    pub timestamp: String,
}

impl Exchange {
    /// Parsed source label. Labels this build does not know map to `Unknown`.
    pub fn source_kind(&self) -> ExchangeSource {
        self.source.parse().unwrap_or_default()
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// Input for recording a new exchange.
#[derive(Debug, Clone)]
pub struct CreateExchange {
    pub prompt: String,
    pub image: Option<String>,
    pub response: String,
    pub source: ExchangeSource,
}
