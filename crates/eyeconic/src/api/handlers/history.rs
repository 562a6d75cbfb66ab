//! History handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::attachment::MediaStore;
use crate::history::Exchange;

/// Public view of an exchange.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub id: i64,
    pub prompt: String,
    /// URL of the stored image, if the exchange carried one.
    pub image: Option<String>,
    pub response: String,
    pub source: String,
    pub timestamp: String,
}

impl From<Exchange> for ExchangeResponse {
    fn from(exchange: Exchange) -> Self {
        let image = exchange
            .image
            .as_deref()
            .filter(|i| !i.is_empty())
            .map(MediaStore::public_url);
        Self {
            id: exchange.id,
            prompt: exchange.prompt,
            image,
            response: exchange.response,
            source: exchange.source,
            timestamp: exchange.timestamp,
        }
    }
}

/// List every exchange, newest first.
///
/// GET /chat-history/
pub async fn list_history(State(state): State<AppState>) -> ApiResult<Json<Vec<ExchangeResponse>>> {
    let exchanges = state.chat.history().await.map_err(|e| {
        error!(error = ?e, "failed to list chat history");
        ApiError::internal("failed to load chat history")
    })?;

    Ok(Json(exchanges.into_iter().map(ExchangeResponse::from).collect()))
}
