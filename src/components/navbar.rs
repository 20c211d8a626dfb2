use leptos::prelude::*;
use leptos_router::components::A;

const LINKS: &[(&str, &str)] = &[
	("/", "Home"),
	("/cypher", "Cypher Queries"),
	("/analytics", "Analytics"),
	("/kg-display", "Graph Display"),
	("/dataset", "Dataset"),
];

#[component]
pub fn Navbar() -> impl IntoView {
	view! {
		<header class="navbar">
			<span class="navbar-title">"Knowledge Graph"</span>
			<nav>
				{LINKS
					.iter()
					.map(|(href, text)| view! { <A href=*href>{*text}</A> })
					.collect_view()}
			</nav>
		</header>
	}
}
