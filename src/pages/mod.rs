pub mod analytics;
pub mod cypher;
pub mod dataset;
pub mod graph_display;
pub mod home;
pub mod not_found;
