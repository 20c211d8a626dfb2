//! Graph database access.
//!
//! A [`GraphDriver`] hands out [`GraphSession`]s. Sessions hold a server-side
//! resource, so callers go through [`with_session`], which closes the session
//! on every exit path.

mod http;

use std::future::Future;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::graph::{GraphRecord, GraphView, NormalizerConfig, normalize_with};

pub use http::{HttpDriver, HttpSession};

/// An open session against the graph database.
///
/// Sessions are cheap handles; clones refer to the same server-side session.
#[async_trait(?Send)]
pub trait GraphSession: Clone {
	/// Run a `(n)-[r]->(m)` shaped statement and return one record per relationship.
	async fn run(&self, cypher: &str) -> AppResult<Vec<GraphRecord>>;

	/// Release the session. Further `run` calls on any clone will fail.
	async fn close(&self) -> AppResult<()>;
}

/// Opens sessions.
#[async_trait(?Send)]
pub trait GraphDriver {
	type Session: GraphSession;

	async fn open(&self) -> AppResult<Self::Session>;
}

/// Open a session, run `work` with it and close it again, whatever `work` returns.
///
/// An error from `work` wins over a close error. A close error after
/// successful work is logged and the work's value is still returned.
pub async fn with_session<D, F, Fut, T>(driver: &D, work: F) -> AppResult<T>
where
	D: GraphDriver + ?Sized,
	F: FnOnce(D::Session) -> Fut,
	Fut: Future<Output = AppResult<T>>,
{
	let session = driver.open().await?;
	let outcome = work(session.clone()).await;

	if let Err(err) = session.close().await {
		match &outcome {
			Ok(_) => log::warn!("graph session did not close cleanly: {err}"),
			Err(work_err) => log::error!("graph session close failed ({err}) after: {work_err}"),
		}
	}
	outcome
}

/// Every connected pair and the relationship joining them, at most `limit` rows.
pub fn relationship_query(limit: usize) -> String {
	format!("MATCH (n)-[r]->(m) RETURN n, r, m LIMIT {}", limit.max(1))
}

/// Fetch up to `limit` relationships and normalize them for the renderer.
pub async fn fetch_graph_view<D>(
	driver: &D,
	limit: usize,
	config: &NormalizerConfig,
) -> AppResult<GraphView>
where
	D: GraphDriver + ?Sized,
{
	let cypher = relationship_query(limit);
	log::debug!("fetching graph: {cypher}");
	let records = with_session(driver, move |session| async move {
		session.run(&cypher).await
	})
	.await?;
	log::info!("fetched {} relationship records", records.len());
	Ok(normalize_with(&records, config))
}
