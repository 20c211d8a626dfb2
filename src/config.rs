//! Runtime endpoints and limits, baked in at build time.

/// Where the backend API and the graph database live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	pub api_base_url: String,
	pub neo4j_url: String,
	pub neo4j_database: String,
	/// Empty disables basic auth.
	pub neo4j_user: String,
	pub neo4j_password: String,
	/// Upper bound on relationship rows fetched for the graph display.
	pub graph_limit: usize,
}

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_NEO4J_URL: &str = "http://localhost:7474";
pub const DEFAULT_GRAPH_LIMIT: usize = 200;

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_API_URL.into(),
			neo4j_url: DEFAULT_NEO4J_URL.into(),
			neo4j_database: "neo4j".into(),
			neo4j_user: "neo4j".into(),
			neo4j_password: String::new(),
			graph_limit: DEFAULT_GRAPH_LIMIT,
		}
	}
}

impl AppConfig {
	/// Read the `KG_*` variables captured when the crate was compiled.
	pub fn from_build_env() -> Self {
		Self::from_lookup(|key| {
			let baked = match key {
				"KG_API_URL" => option_env!("KG_API_URL"),
				"KG_NEO4J_URL" => option_env!("KG_NEO4J_URL"),
				"KG_NEO4J_DATABASE" => option_env!("KG_NEO4J_DATABASE"),
				"KG_NEO4J_USER" => option_env!("KG_NEO4J_USER"),
				"KG_NEO4J_PASSWORD" => option_env!("KG_NEO4J_PASSWORD"),
				"KG_GRAPH_LIMIT" => option_env!("KG_GRAPH_LIMIT"),
				_ => None,
			};
			baked.map(str::to_owned)
		})
	}

	/// Build a config from an arbitrary key lookup; unset keys keep defaults.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		let mut config = Self::default();
		let set = |target: &mut String, key: &str| {
			if let Some(value) = lookup(key) {
				*target = value;
			}
		};

		set(&mut config.api_base_url, "KG_API_URL");
		set(&mut config.neo4j_url, "KG_NEO4J_URL");
		set(&mut config.neo4j_database, "KG_NEO4J_DATABASE");
		set(&mut config.neo4j_user, "KG_NEO4J_USER");
		set(&mut config.neo4j_password, "KG_NEO4J_PASSWORD");

		if let Some(raw) = lookup("KG_GRAPH_LIMIT") {
			match raw.trim().parse::<usize>() {
				Ok(limit) if limit > 0 => config.graph_limit = limit,
				_ => log::warn!(
					"ignoring KG_GRAPH_LIMIT={raw:?}, using {}",
					DEFAULT_GRAPH_LIMIT
				),
			}
		}

		config.api_base_url = config.api_base_url.trim_end_matches('/').to_owned();
		config.neo4j_url = config.neo4j_url.trim_end_matches('/').to_owned();
		config
	}
}
