//! Error types shared by the database session, the backend client and the pages.

use thiserror::Error;

/// Errors raised while talking to the backend API or the graph database.
#[derive(Error, Debug)]
pub enum AppError {
	/// Transport failure: unreachable host, aborted fetch, bad body.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// JSON serialization/deserialization error
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// The graph database rejected a statement.
	#[error("Query error: {0}")]
	Query(String),

	/// The backend answered with a non-success status.
	#[error("Backend returned {status}: {message}")]
	Backend {
		/// HTTP status code.
		status: u16,
		/// Message extracted from the response body.
		message: String,
	},

	/// A response did not have the expected shape.
	#[error("Protocol error: {0}")]
	Protocol(String),

	/// A browser API call failed.
	#[error("Browser error: {0}")]
	Browser(String),
}

/// Shorthand result used across the crate.
pub type AppResult<T> = Result<T, AppError>;

impl From<wasm_bindgen::JsValue> for AppError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Browser(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}
