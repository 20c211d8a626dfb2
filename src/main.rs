use kg_explorer::{App, init_logging};

fn main() {
	init_logging(log::Level::Debug);
	leptos::mount::mount_to_body(App);
}
