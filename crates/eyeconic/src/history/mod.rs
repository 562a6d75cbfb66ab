//! Chat history: the append-only log of prompt/response exchanges.

mod models;
mod repository;

pub use models::{CreateExchange, Exchange, ExchangeSource};
pub use repository::ExchangeRepository;
