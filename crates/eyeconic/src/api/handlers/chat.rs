//! Chat handler and its request decoding.
//!
//! `POST /chat/` accepts three shapes:
//! - `application/json` with `{"prompt": "..."}` (web clients)
//! - `multipart/form-data` with a `prompt` field and an optional `image` file (mobile clients)
//! - `application/x-www-form-urlencoded` with a `prompt` field
//!
//! Any other content type is treated as carrying no prompt.

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chat::{ChatRequest, ImageUpload};
use crate::history::ExchangeSource;

/// Structured request body.
#[derive(Debug, Deserialize)]
pub struct ChatJsonBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Url-encoded form body.
#[derive(Debug, Deserialize)]
pub struct ChatFormBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful chat reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// A chat request decoded from whichever shape the client used.
#[derive(Debug)]
pub struct ChatSubmission(pub ChatRequest);

enum BodyShape {
    Json,
    Multipart,
    Form,
    Other,
}

fn body_shape(req: &Request) -> BodyShape {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        BodyShape::Json
    } else if content_type.starts_with("multipart/form-data") {
        BodyShape::Multipart
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyShape::Form
    } else {
        BodyShape::Other
    }
}

impl<S> FromRequest<S> for ChatSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request = match body_shape(&req) {
            BodyShape::Json => {
                let Json(body) = Json::<ChatJsonBody>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                ChatRequest {
                    prompt: body.prompt,
                    image: None,
                    source: ExchangeSource::Web,
                }
            }
            BodyShape::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                read_multipart(multipart).await?
            }
            BodyShape::Form => {
                let Form(body) = Form::<ChatFormBody>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                ChatRequest {
                    prompt: body.prompt,
                    image: None,
                    source: ExchangeSource::Mobile,
                }
            }
            BodyShape::Other => ChatRequest {
                prompt: None,
                image: None,
                source: ExchangeSource::Unknown,
            },
        };

        Ok(ChatSubmission(request))
    }
}

async fn read_multipart(mut multipart: Multipart) -> ApiResult<ChatRequest> {
    let mut prompt = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("prompt") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid prompt field: {}", e)))?;
                prompt = Some(text);
            }
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid image field: {}", e)))?;
                debug!(?file_name, ?content_type, size = bytes.len(), "received image upload");
                image = Some(ImageUpload { bytes });
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    Ok(ChatRequest {
        prompt,
        image,
        source: ExchangeSource::Mobile,
    })
}

/// Relay a prompt (and optional image) to the model.
///
/// POST /chat/
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    ChatSubmission(request): ChatSubmission,
) -> ApiResult<Json<ChatResponse>> {
    let exchange = state.chat.chat(request).await?;
    Ok(Json(ChatResponse {
        response: exchange.response,
    }))
}
