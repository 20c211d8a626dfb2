use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body shared by the chat and run-query endpoints.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
	pub query: &'a str,
}

/// Answer from the chat endpoint: markdown-ish text from the language model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatReply {
	pub response: String,
}

/// What a Cypher run produced.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutcome {
	/// One JSON object per returned record.
	Rows(Vec<Value>),
	/// The database refused the query; the message is user-facing.
	Failed(String),
}

pub const QUERY_FAILED_FALLBACK: &str = "Failed to run query.";

#[derive(Debug, Deserialize)]
pub(crate) struct RunQueryResponse {
	pub success: bool,
	#[serde(default)]
	pub result: Vec<Value>,
	#[serde(default)]
	pub error: Option<String>,
}

impl From<RunQueryResponse> for QueryOutcome {
	fn from(response: RunQueryResponse) -> Self {
		if response.success {
			Self::Rows(response.result)
		} else {
			Self::Failed(
				response
					.error
					.filter(|e| !e.is_empty())
					.unwrap_or_else(|| QUERY_FAILED_FALLBACK.to_string()),
			)
		}
	}
}

/// Acknowledgement of a processed upload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadReceipt {
	pub message: String,
	/// Text the backend extracted before building the graph from it.
	#[serde(default)]
	pub extracted_text: String,
}

/// Pull a human-readable message out of an error body.
pub(crate) fn error_message(body: &Value, field: &str) -> String {
	body.get(field)
		.or_else(|| body.get("detail"))
		.and_then(Value::as_str)
		.unwrap_or("Unknown error")
		.to_string()
}
