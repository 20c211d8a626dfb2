use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::analytics::{AnalyticsReport, pie_slices};
use crate::api::BackendClient;
use crate::config::AppConfig;

const PIE_RADIUS: f64 = 100.0;

#[component]
pub fn AnalyticsPage() -> impl IntoView {
	let report = RwSignal::new(AnalyticsReport::placeholder());
	let client = BackendClient::new(&expect_context::<AppConfig>().api_base_url);

	spawn_local(async move {
		match client.analytics().await {
			Ok(fetched) => {
				log::info!("analytics: {fetched:?}");
				report.set(fetched);
			}
			Err(err) => log::error!("Error fetching analytics: {err}"),
		}
	});

	let metrics = move || {
		report
			.get()
			.metric_rows()
			.into_iter()
			.map(|(label, value)| view! {
				<li>{label}": "<b>{value}</b></li>
			})
			.collect_view()
	};

	let chart = move || {
		let slices = pie_slices(&report.get().composition(), PIE_RADIUS);
		let legend = slices.clone();
		view! {
			<svg
				class="pie"
				viewBox=format!("0 0 {0} {0}", PIE_RADIUS * 2.0)
				width="220"
				height="220"
			>
				{slices
					.into_iter()
					.map(|s| view! { <path d=s.path fill=s.color stroke="#1e1e1e" stroke-width="1" /> })
					.collect_view()}
			</svg>
			<ul class="legend">
				{legend
					.into_iter()
					.map(|s| view! {
						<li>
							<span class="swatch" style=format!("background: {}", s.color)></span>
							{format!("{} ({:.0}%)", s.label, s.fraction * 100.0)}
						</li>
					})
					.collect_view()}
			</ul>
		}
	};

	view! {
		<div class="page analytics">
			<h1>"Knowledge Graph Analytics"</h1>
			<section class="panel">
				<h2>"Key Metrics"</h2>
				<ul class="metrics">{metrics}</ul>
			</section>
			<section class="panel">
				<h2>"Graph Composition"</h2>
				{chart}
			</section>
			<section class="panel">
				<h2>"Additional Insights"</h2>
				<p>
					"Graph density indicates the proportion of possible edges that are present. "
					"A higher density means a more interconnected graph."
				</p>
				<p>
					"The largest connected component is crucial for analyzing the most "
					"significant subgraph in the Knowledge Graph."
				</p>
			</section>
		</div>
	}
}
