//! Client for the knowledge-graph backend's REST API.

mod models;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::analytics::AnalyticsReport;
use crate::error::{AppError, AppResult};

pub use models::{ChatReply, QUERY_FAILED_FALLBACK, QueryOutcome, QueryRequest, UploadReceipt};
use models::{RunQueryResponse, error_message};

/// HTTP client for `/chatbot`, `/run-query`, `/analytics` and `/upload`.
#[derive(Clone, Debug)]
pub struct BackendClient {
	base_url: String,
	http_client: Client,
}

impl BackendClient {
	/// Create a client for the API rooted at `base_url`.
	///
	/// ```no_run
	/// # use kg_explorer::api::BackendClient;
	/// let client = BackendClient::new("http://localhost:8000/");
	/// assert_eq!(client.base_url(), "http://localhost:8000");
	/// ```
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			http_client: Client::new(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path)
	}

	/// Ask a natural-language question about the graph.
	pub async fn chat(&self, question: &str) -> AppResult<ChatReply> {
		log::debug!("chat request ({} chars)", question.len());
		let response = self
			.http_client
			.post(self.url("chatbot"))
			.json(&QueryRequest { query: question })
			.send()
			.await?;
		decode(response, "response").await
	}

	/// Run raw Cypher through the backend.
	///
	/// A query the database rejects is an `Ok(QueryOutcome::Failed)`, not an
	/// error; only transport and decoding failures are `Err`.
	pub async fn run_query(&self, cypher: &str) -> AppResult<QueryOutcome> {
		log::debug!("run-query: {cypher}");
		let response = self
			.http_client
			.post(self.url("run-query"))
			.json(&QueryRequest { query: cypher })
			.send()
			.await?;
		let body: RunQueryResponse = response.json().await?;
		Ok(body.into())
	}

	pub async fn analytics(&self) -> AppResult<AnalyticsReport> {
		let response = self.http_client.get(self.url("analytics")).send().await?;
		decode(response, "error").await
	}

	/// Upload a document for the backend to turn into graph data.
	pub async fn upload(
		&self,
		file_name: &str,
		bytes: Vec<u8>,
		mime: &str,
	) -> AppResult<UploadReceipt> {
		let mime = if mime.is_empty() {
			"application/octet-stream"
		} else {
			mime
		};
		log::info!("uploading {file_name} ({} bytes, {mime})", bytes.len());
		let part = Part::bytes(bytes)
			.file_name(file_name.to_string())
			.mime_str(mime)?;
		let response = self
			.http_client
			.post(self.url("upload"))
			.multipart(Form::new().part("file", part))
			.send()
			.await?;
		decode(response, "message").await
	}
}

/// Decode a success body, or turn a failure body into [`AppError::Backend`]
/// using its `message_field`.
async fn decode<T: DeserializeOwned>(response: Response, message_field: &str) -> AppResult<T> {
	let status = response.status();
	if status.is_success() {
		return Ok(response.json().await?);
	}

	let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
	let message = error_message(&body, message_field);
	log::error!("backend returned {status}: {message}");
	Err(AppError::Backend {
		status: status.as_u16(),
		message,
	})
}
