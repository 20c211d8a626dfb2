use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{BackendClient, QueryOutcome};
use crate::config::AppConfig;
use crate::error::AppResult;

pub const PREFILLED_QUERIES: &[&str] = &[
	"MATCH (n) RETURN n LIMIT 10",
	"MATCH (n)-[r]->(m) RETURN n, r, m LIMIT 10",
	"MATCH (n {name: 'Alice'}) RETURN n",
];

pub const RUN_FAILURE_TEXT: &str = "An error occurred while running the query.";

/// One editable query box with its own run state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySlot {
	pub query: String,
	pub running: bool,
	/// Pretty-printed JSON rows of the last successful run.
	pub result: Option<String>,
	pub error: Option<String>,
}

impl QuerySlot {
	pub fn new(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			..Self::default()
		}
	}

	pub fn prefilled() -> Vec<Self> {
		PREFILLED_QUERIES.iter().copied().map(Self::new).collect()
	}

	/// Clear the previous outcome and mark the slot busy.
	pub fn begin(&mut self) {
		self.running = true;
		self.result = None;
		self.error = None;
	}

	pub fn finish(&mut self, outcome: AppResult<QueryOutcome>) {
		self.running = false;
		match outcome {
			Ok(QueryOutcome::Rows(rows)) => {
				self.result = Some(serde_json::to_string_pretty(&rows).unwrap_or_default());
			}
			Ok(QueryOutcome::Failed(message)) => self.error = Some(message),
			Err(err) => {
				log::error!("Error: {err}");
				self.error = Some(RUN_FAILURE_TEXT.to_string());
			}
		}
	}
}

/// Run ad-hoc Cypher against the backend, one result panel per query.
#[component]
pub fn CypherQueryPage() -> impl IntoView {
	let api = StoredValue::new(expect_context::<AppConfig>().api_base_url);
	let slots = RwSignal::new(QuerySlot::prefilled());

	let run = move |index: usize| {
		let Some(query) = slots.with_untracked(|s| s.get(index).map(|q| q.query.clone())) else {
			return;
		};
		slots.update(|s| {
			if let Some(slot) = s.get_mut(index) {
				slot.begin();
			}
		});
		let client = BackendClient::new(&api.get_value());
		spawn_local(async move {
			let outcome = client.run_query(&query).await;
			slots.update(|s| {
				if let Some(slot) = s.get_mut(index) {
					slot.finish(outcome);
				}
			});
		});
	};

	let running = move |index: usize| slots.with(|s| s.get(index).is_some_and(|q| q.running));

	view! {
		<div class="page cypher">
			<h1>"Run Cypher Queries"</h1>
			<For
				each=move || 0..slots.with(Vec::len)
				key=|index| *index
				children=move |index: usize| {
					view! {
						<div class="query-slot">
							<textarea
								rows="4"
								placeholder=format!("Enter Cypher query {}", index + 1)
								prop:value=move || {
									slots.with(|s| s.get(index).map(|q| q.query.clone()).unwrap_or_default())
								}
								on:input=move |ev| {
									let text = event_target_value(&ev);
									slots.update(|s| {
										if let Some(slot) = s.get_mut(index) {
											slot.query = text;
										}
									});
								}
							/>
							<button on:click=move |_| run(index) disabled=move || running(index)>
								{move || if running(index) { "Running..." } else { "Run Query" }}
							</button>
							{move || {
								slots
									.with(|s| s.get(index).and_then(|q| q.result.clone()))
									.map(|json| view! { <pre class="query-result">{json}</pre> })
							}}
							{move || {
								slots
									.with(|s| s.get(index).and_then(|q| q.error.clone()))
									.map(|msg| view! { <p class="query-error">{msg}</p> })
							}}
						</div>
					}
				}
			/>
			<button class="add-query" on:click=move |_| slots.update(|s| s.push(QuerySlot::default()))>
				"Add Query Field"
			</button>
		</div>
	}
}
