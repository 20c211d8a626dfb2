//! Knowledge-graph explorer: a Leptos client-side app for chatting with,
//! querying and visualizing a graph database.
//!
//! The reusable parts live outside the UI: [`graph`] normalizes traversal
//! records for rendering, [`db`] scopes graph database sessions, [`api`]
//! talks to the backend.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod analytics;
pub mod api;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;

mod components;
mod pages;

use crate::components::Navbar;
use crate::config::AppConfig;
use crate::pages::analytics::AnalyticsPage;
use crate::pages::cypher::CypherQueryPage;
use crate::pages::dataset::DatasetUpload;
use crate::pages::graph_display::GraphDisplay;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging(level: Level) {
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("Logging initialized at {level}");
}

/// Router for every page, behind a shared navigation bar.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();
	provide_context(AppConfig::from_build_env());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Knowledge Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Navbar />
			<main>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Home />
					<Route path=path!("/chatbot") view=Home />
					<Route path=path!("/cypher") view=CypherQueryPage />
					<Route path=path!("/analytics") view=AnalyticsPage />
					<Route path=path!("/kg-display") view=GraphDisplay />
					<Route path=path!("/dataset") view=DatasetUpload />
				</Routes>
			</main>
		</Router>
	}
}
