pub mod force_graph;
mod navbar;

pub use navbar::Navbar;
