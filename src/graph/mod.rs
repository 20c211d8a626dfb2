//! Graph records as returned by the database and their visualization shapes.

mod normalize;
mod record;

pub use normalize::{
	Arrows, DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, EdgeColor, FALLBACK_EDGE_LABEL,
	FALLBACK_NODE_LABEL, GraphView, NormalizerConfig, VisEdge, VisNode, display_text, normalize,
	normalize_with,
};
pub use record::{Entity, GraphRecord, Properties, Relationship};
