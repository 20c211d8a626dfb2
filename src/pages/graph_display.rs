use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::AppConfig;
use crate::db::{HttpDriver, fetch_graph_view};
use crate::graph::{GraphView, NormalizerConfig};

#[derive(Clone, Debug, PartialEq)]
enum LoadState {
	Loading,
	Ready { nodes: usize, edges: usize },
	Failed(String),
}

/// Whole-graph view: fetch a bounded set of relationships and lay them out.
#[component]
pub fn GraphDisplay() -> impl IntoView {
	let config = expect_context::<AppConfig>();
	let view = RwSignal::new(GraphView::default());
	let state = RwSignal::new(LoadState::Loading);

	spawn_local(async move {
		let driver = HttpDriver::from_config(&config);
		match fetch_graph_view(&driver, config.graph_limit, &NormalizerConfig::default()).await {
			Ok(fetched) => {
				state.set(LoadState::Ready {
					nodes: fetched.nodes.len(),
					edges: fetched.edges.len(),
				});
				view.set(fetched);
			}
			Err(err) => {
				log::error!("Error fetching data from Neo4j: {err}");
				state.set(LoadState::Failed(err.to_string()));
			}
		}
	});

	let overlay = move || match state.get() {
		LoadState::Loading => view! { <p>"Loading graph..."</p> }.into_any(),
		LoadState::Ready { nodes: 0, .. } => view! { <p>"The graph is empty."</p> }.into_any(),
		LoadState::Ready { nodes, edges } => {
			view! { <p>{format!("{nodes} nodes, {edges} relationships")}</p> }.into_any()
		}
		LoadState::Failed(message) => {
			view! { <p class="error">"Could not load the graph: "{message}</p> }.into_any()
		}
	};

	view! {
		<div class="page graph-display">
			<ForceGraphCanvas data=view />
			<div class="graph-overlay">{overlay}</div>
		</div>
	}
}
