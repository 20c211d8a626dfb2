//! Neo4j HTTP transactional endpoint.
//!
//! A session is an explicit transaction: opened with `POST /db/{name}/tx`,
//! used with `POST` on the transaction URL and released with `DELETE` on it
//! (a rollback, the session never writes).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use super::{GraphDriver, GraphSession};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::graph::{Entity, GraphRecord, Relationship};

#[derive(Clone, Debug)]
struct Credentials {
	user: String,
	password: String,
}

/// Driver for a Neo4j server's HTTP API.
pub struct HttpDriver {
	client: Client,
	base_url: String,
	database: String,
	credentials: Option<Credentials>,
}

impl HttpDriver {
	pub fn new(base_url: &str, database: &str) -> Self {
		Self {
			client: Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
			database: database.to_string(),
			credentials: None,
		}
	}

	pub fn with_basic_auth(mut self, user: &str, password: &str) -> Self {
		self.credentials = Some(Credentials {
			user: user.to_string(),
			password: password.to_string(),
		});
		self
	}

	pub fn from_config(config: &AppConfig) -> Self {
		let driver = Self::new(&config.neo4j_url, &config.neo4j_database);
		if config.neo4j_user.is_empty() {
			driver
		} else {
			driver.with_basic_auth(&config.neo4j_user, &config.neo4j_password)
		}
	}

	fn begin_url(&self) -> String {
		format!("{}/db/{}/tx", self.base_url, self.database)
	}
}

#[async_trait(?Send)]
impl GraphDriver for HttpDriver {
	type Session = HttpSession;

	async fn open(&self) -> AppResult<HttpSession> {
		let request = self
			.client
			.post(self.begin_url())
			.json(&StatementBatch { statements: vec![] });
		let opened = send(authorize(request, self.credentials.as_ref())).await?;

		let tx_url = transaction_url(opened.commit.as_deref())?;

		log::debug!("opened graph session {tx_url}");
		Ok(HttpSession {
			client: self.client.clone(),
			tx_url,
			credentials: self.credentials.clone(),
		})
	}
}

/// One open transaction on the server.
#[derive(Clone, Debug)]
pub struct HttpSession {
	client: Client,
	tx_url: String,
	credentials: Option<Credentials>,
}

impl HttpSession {
	/// URL of the server-side transaction backing this session.
	pub fn tx_url(&self) -> &str {
		&self.tx_url
	}
}

#[async_trait(?Send)]
impl GraphSession for HttpSession {
	async fn run(&self, cypher: &str) -> AppResult<Vec<GraphRecord>> {
		let batch = StatementBatch {
			statements: vec![Statement {
				statement: cypher,
				result_data_contents: ["graph"],
			}],
		};
		let request = self.client.post(&self.tx_url).json(&batch);
		let response = send(authorize(request, self.credentials.as_ref())).await?;
		Ok(records_from_response(response))
	}

	async fn close(&self) -> AppResult<()> {
		let request = self.client.delete(&self.tx_url);
		send(authorize(request, self.credentials.as_ref())).await?;
		log::debug!("closed graph session {}", self.tx_url);
		Ok(())
	}
}

fn authorize(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
	match credentials {
		Some(c) => request.basic_auth(&c.user, Some(&c.password)),
		None => request,
	}
}

/// The transaction's own URL, derived from the commit URL the server
/// returns when it opens one.
fn transaction_url(commit: Option<&str>) -> AppResult<String> {
	let commit =
		commit.ok_or_else(|| AppError::Protocol("transaction response has no commit URL".into()))?;
	commit
		.strip_suffix("/commit")
		.map(str::to_string)
		.ok_or_else(|| AppError::Protocol(format!("unexpected commit URL {commit}")))
}

async fn send(request: RequestBuilder) -> AppResult<TxResponse> {
	let response = request.send().await?;
	let status = response.status();
	let body = response.text().await?;
	decode_envelope(status, &body)
}

/// Decode the transactional envelope. Server-reported errors take
/// precedence over the HTTP status.
fn decode_envelope(status: StatusCode, body: &str) -> AppResult<TxResponse> {
	let parsed = match serde_json::from_str::<TxResponse>(body) {
		Ok(parsed) => parsed,
		Err(_) if !status.is_success() => {
			return Err(AppError::Backend {
				status: status.as_u16(),
				message: body.to_string(),
			});
		}
		Err(err) => return Err(err.into()),
	};

	if let Some(first) = parsed.errors.first() {
		return Err(AppError::Query(format!("{}: {}", first.code, first.message)));
	}
	if !status.is_success() {
		return Err(AppError::Backend {
			status: status.as_u16(),
			message: format!("graph database returned {status}"),
		});
	}
	Ok(parsed)
}

/// Flatten graph-format rows into records, one per relationship.
fn records_from_response(response: TxResponse) -> Vec<GraphRecord> {
	let mut records = Vec::new();

	for row in response.results.into_iter().flat_map(|r| r.data) {
		let Some(graph) = row.graph else {
			continue;
		};
		let nodes: HashMap<&str, &Entity> =
			graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
		let endpoint = |id: &str| {
			nodes
				.get(id)
				.map(|n| (*n).clone())
				.unwrap_or_else(|| Entity::new(id))
		};

		for rel in &graph.relationships {
			records.push(GraphRecord::new(
				endpoint(&rel.start),
				endpoint(&rel.end),
				rel.clone(),
			));
		}
	}
	records
}

#[derive(Serialize)]
struct StatementBatch<'a> {
	statements: Vec<Statement<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Statement<'a> {
	statement: &'a str,
	result_data_contents: [&'static str; 1],
}

#[derive(Deserialize)]
struct TxResponse {
	#[serde(default)]
	commit: Option<String>,
	#[serde(default)]
	results: Vec<StatementResult>,
	#[serde(default)]
	errors: Vec<ServerError>,
}

#[derive(Deserialize)]
struct StatementResult {
	#[serde(default)]
	data: Vec<ResultRow>,
}

#[derive(Deserialize)]
struct ResultRow {
	#[serde(default)]
	graph: Option<RowGraph>,
}

#[derive(Deserialize)]
struct RowGraph {
	#[serde(default)]
	nodes: Vec<Entity>,
	#[serde(default)]
	relationships: Vec<Relationship>,
}

#[derive(Deserialize)]
struct ServerError {
	code: String,
	message: String,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::normalize;

	fn response(value: serde_json::Value) -> TxResponse {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn graph_rows_become_records() {
		let body = response(json!({
			"results": [{
				"columns": ["n", "r", "m"],
				"data": [
					{ "graph": {
						"nodes": [
							{ "id": "1", "elementId": "4:x:1", "labels": ["Person"], "properties": { "name": "Alice" } },
							{ "id": "2", "labels": ["Person"], "properties": { "id": "Bob" } }
						],
						"relationships": [
							{ "id": "9", "type": "KNOWS", "startNode": "1", "endNode": "2", "properties": {} }
						]
					} },
					{ "graph": {
						"nodes": [
							{ "id": "2", "labels": [], "properties": { "id": "Bob" } },
							{ "id": "1", "labels": [], "properties": { "name": "Alice" } }
						],
						"relationships": [
							{ "id": "10", "type": "FOLLOWS", "startNode": "2", "endNode": "1" }
						]
					} }
				]
			}],
			"errors": []
		}));

		let records = records_from_response(body);
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].source.id, "1");
		assert_eq!(records[0].target.labels, ["Person"]);
		assert_eq!(records[1].source.id, "2");
		assert_eq!(records[1].relationship.rel_type, "FOLLOWS");

		let view = normalize(&records);
		assert_eq!(view.nodes.len(), 2);
		assert_eq!(view.edges.len(), 2);
	}

	#[test]
	fn self_loops_reuse_the_single_row_node() {
		let body = response(json!({
			"results": [{ "data": [{ "graph": {
				"nodes": [{ "id": 5, "properties": { "name": "Loop" } }],
				"relationships": [{ "id": 1, "type": "SELF", "startNode": 5, "endNode": 5 }]
			} }] }]
		}));

		let records = records_from_response(body);
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].source, records[0].target);
		assert_eq!(records[0].source.id, "5");
	}

	#[test]
	fn missing_endpoint_nodes_become_bare_entities() {
		let body = response(json!({
			"results": [{ "data": [
				{ "graph": {
					"nodes": [],
					"relationships": [{ "type": "X", "startNode": "a", "endNode": "b" }]
				} },
				{ "row": [1] }
			] }]
		}));

		let records = records_from_response(body);
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].target, Entity::new("b"));
	}

	#[test]
	fn statements_serialize_in_wire_shape() {
		let batch = StatementBatch {
			statements: vec![Statement {
				statement: "RETURN 1",
				result_data_contents: ["graph"],
			}],
		};
		assert_eq!(
			serde_json::to_value(&batch).unwrap(),
			json!({ "statements": [{ "statement": "RETURN 1", "resultDataContents": ["graph"] }] })
		);
	}

	#[test]
	fn driver_urls_and_auth_follow_config() {
		let config = AppConfig {
			neo4j_url: "http://db:7474/".into(),
			neo4j_database: "movies".into(),
			neo4j_user: String::new(),
			..AppConfig::default()
		};
		let driver = HttpDriver::from_config(&config);
		assert_eq!(driver.begin_url(), "http://db:7474/db/movies/tx");
		assert!(driver.credentials.is_none());

		let driver = HttpDriver::from_config(&AppConfig::default());
		assert!(driver.credentials.is_some());
	}

	#[test]
	fn server_errors_become_query_errors() {
		let body = r#"{ "results": [], "errors": [
			{ "code": "Neo.ClientError.Statement.SyntaxError", "message": "Invalid input" }
		] }"#;
		match decode_envelope(StatusCode::OK, body) {
			Err(AppError::Query(message)) => {
				assert_eq!(message, "Neo.ClientError.Statement.SyntaxError: Invalid input");
			}
			_ => panic!("expected a query error"),
		}
	}

	#[test]
	fn server_errors_take_precedence_over_status() {
		let body = r#"{ "errors": [{ "code": "Neo.ClientError.Security.Unauthorized", "message": "bad credentials" }] }"#;
		assert!(matches!(
			decode_envelope(StatusCode::UNAUTHORIZED, body),
			Err(AppError::Query(message)) if message.ends_with("bad credentials")
		));
	}

	#[test]
	fn non_json_failures_keep_the_body() {
		assert!(matches!(
			decode_envelope(StatusCode::BAD_GATEWAY, "<html>upstream down</html>"),
			Err(AppError::Backend { status: 502, message }) if message == "<html>upstream down</html>"
		));
	}

	#[test]
	fn clean_envelope_with_failing_status_is_a_backend_error() {
		assert!(matches!(
			decode_envelope(StatusCode::NOT_FOUND, r#"{ "results": [], "errors": [] }"#),
			Err(AppError::Backend { status: 404, .. })
		));
	}

	#[test]
	fn unreadable_success_body_is_a_serialization_error() {
		assert!(matches!(
			decode_envelope(StatusCode::OK, "not json"),
			Err(AppError::Serialization(_))
		));
	}

	#[test]
	fn successful_envelope_is_returned() {
		let body = r#"{ "commit": "http://db:7474/db/neo4j/tx/7/commit", "results": [], "errors": [] }"#;
		let Ok(parsed) = decode_envelope(StatusCode::CREATED, body) else {
			panic!("expected a decoded envelope");
		};
		assert_eq!(parsed.commit.as_deref(), Some("http://db:7474/db/neo4j/tx/7/commit"));
	}

	#[test]
	fn transaction_url_strips_the_commit_suffix() {
		assert_eq!(
			transaction_url(Some("http://db:7474/db/neo4j/tx/7/commit")).unwrap(),
			"http://db:7474/db/neo4j/tx/7"
		);
		assert!(matches!(transaction_url(None), Err(AppError::Protocol(_))));
		assert!(matches!(
			transaction_url(Some("http://db:7474/db/neo4j/tx/7")),
			Err(AppError::Protocol(message)) if message.contains("tx/7")
		));
	}
}
