//! Turns traversal records into renderer-facing nodes and edges.
//!
//! Nodes are deduplicated by entity identifier with the first occurrence
//! winning, edges are kept one per record so parallel relationships between
//! the same pair survive.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::{Entity, GraphRecord};

pub const DEFAULT_NODE_COLOR: &str = "#4caf50";
pub const DEFAULT_EDGE_COLOR: &str = "#42a5f5";
pub const FALLBACK_NODE_LABEL: &str = "Node";
pub const FALLBACK_EDGE_LABEL: &str = "REL";

/// A node as the graph renderer expects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisNode {
	pub id: String,
	pub label: String,
	pub color: String,
}

/// Stroke color of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeColor {
	pub color: String,
}

/// Arrow-head placement of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrows {
	pub to: bool,
}

/// An edge as the graph renderer expects it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisEdge {
	pub from: String,
	pub to: String,
	pub label: String,
	pub color: EdgeColor,
	pub arrows: Arrows,
}

/// The normalized graph handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
	pub nodes: Vec<VisNode>,
	pub edges: Vec<VisEdge>,
}

impl GraphView {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

/// Labeling and styling rules applied during normalization.
///
/// The defaults label source entities by their `name` property and target
/// entities by their `id` property, which is what the graph display has
/// always shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizerConfig {
	pub source_label_key: String,
	pub target_label_key: String,
	pub node_fallback: String,
	pub edge_fallback: String,
	pub node_color: String,
	pub edge_color: String,
}

impl Default for NormalizerConfig {
	fn default() -> Self {
		Self {
			source_label_key: "name".into(),
			target_label_key: "id".into(),
			node_fallback: FALLBACK_NODE_LABEL.into(),
			edge_fallback: FALLBACK_EDGE_LABEL.into(),
			node_color: DEFAULT_NODE_COLOR.into(),
			edge_color: DEFAULT_EDGE_COLOR.into(),
		}
	}
}

/// Normalize with the default labeling rules.
pub fn normalize(records: &[GraphRecord]) -> GraphView {
	normalize_with(records, &NormalizerConfig::default())
}

/// Build a [`GraphView`] from `records`, in input order.
pub fn normalize_with(records: &[GraphRecord], config: &NormalizerConfig) -> GraphView {
	let mut seen: HashSet<&str> = HashSet::with_capacity(records.len() * 2);
	let mut view = GraphView {
		nodes: Vec::new(),
		edges: Vec::with_capacity(records.len()),
	};

	for record in records {
		let (source, target) = (&record.source, &record.target);

		if seen.insert(source.id.as_str()) {
			view.nodes
				.push(vis_node(source, &config.source_label_key, config));
		}
		if seen.insert(target.id.as_str()) {
			view.nodes
				.push(vis_node(target, &config.target_label_key, config));
		}

		let rel_type = record.relationship.rel_type.as_str();
		view.edges.push(VisEdge {
			from: source.id.clone(),
			to: target.id.clone(),
			label: if rel_type.is_empty() {
				config.edge_fallback.clone()
			} else {
				rel_type.to_owned()
			},
			color: EdgeColor {
				color: config.edge_color.clone(),
			},
			arrows: Arrows { to: true },
		});
	}

	log::debug!(
		"normalized {} records into {} nodes / {} edges",
		records.len(),
		view.nodes.len(),
		view.edges.len()
	);
	view
}

fn vis_node(entity: &Entity, label_key: &str, config: &NormalizerConfig) -> VisNode {
	VisNode {
		id: entity.id.clone(),
		label: entity
			.property(label_key)
			.and_then(display_text)
			.unwrap_or_else(|| config.node_fallback.clone()),
		color: config.node_color.clone(),
	}
}

/// Display text for a property value, or `None` for null, `""`, `0` and `false`.
pub fn display_text(value: &Value) -> Option<String> {
	match value {
		Value::Null | Value::Bool(false) => None,
		Value::String(s) if s.is_empty() => None,
		Value::String(s) => Some(s.clone()),
		Value::Number(n) if n.as_f64() == Some(0.0) => None,
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::record::Relationship;
	use serde_json::json;

	fn person(id: &str, name: &str) -> Entity {
		Entity::new(id).with_property("name", name).with_property("id", name)
	}

	fn knows(source: Entity, target: Entity) -> GraphRecord {
		GraphRecord::new(source, target, Relationship::typed("KNOWS"))
	}

	#[test]
	fn alice_knows_bob() {
		let view = normalize(&[knows(person("1", "Alice"), person("2", "Bob"))]);

		assert_eq!(
			view.nodes,
			vec![
				VisNode {
					id: "1".into(),
					label: "Alice".into(),
					color: DEFAULT_NODE_COLOR.into(),
				},
				VisNode {
					id: "2".into(),
					label: "Bob".into(),
					color: DEFAULT_NODE_COLOR.into(),
				},
			]
		);
		assert_eq!(view.edges.len(), 1);
		let edge = &view.edges[0];
		assert_eq!((edge.from.as_str(), edge.to.as_str()), ("1", "2"));
		assert_eq!(edge.label, "KNOWS");
		assert_eq!(edge.color.color, DEFAULT_EDGE_COLOR);
		assert!(edge.arrows.to);
	}

	#[test]
	fn shared_source_yields_one_node() {
		let alice = person("1", "Alice");
		let view = normalize(&[
			knows(alice.clone(), person("2", "Bob")),
			knows(alice, person("3", "Carol")),
		]);

		let ids: Vec<_> = view.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["1", "2", "3"]);
		assert_eq!(view.edges.len(), 2);
		assert_eq!(view.edges[1].to, "3");
	}

	#[test]
	fn parallel_relationships_are_kept() {
		let records = vec![
			knows(person("1", "a"), person("2", "b")),
			GraphRecord::new(person("1", "a"), person("2", "b"), Relationship::typed("LIKES")),
			knows(person("1", "a"), person("2", "b")),
		];
		let view = normalize(&records);

		assert_eq!(view.nodes.len(), 2);
		assert_eq!(view.edges.len(), records.len());
		let labels: Vec<_> = view.edges.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, ["KNOWS", "LIKES", "KNOWS"]);
	}

	#[test]
	fn node_ids_are_unique() {
		let records: Vec<_> = (0..50)
			.map(|i| {
				knows(
					person(&(i % 7).to_string(), "s"),
					person(&(i % 5).to_string(), "t"),
				)
			})
			.collect();
		let view = normalize(&records);

		let unique: HashSet<_> = view.nodes.iter().map(|n| &n.id).collect();
		assert_eq!(unique.len(), view.nodes.len());
		assert_eq!(view.nodes.len(), 7);
		assert_eq!(view.edges.len(), 50);
	}

	#[test]
	fn first_occurrence_labels_win() {
		// "2" is first seen as a target (labeled by its `id` property) and
		// later as a source with a different name.
		let view = normalize(&[
			knows(person("1", "Alice"), Entity::new("2").with_property("id", "bob-key")),
			knows(Entity::new("2").with_property("name", "Bob"), person("1", "Other")),
		]);

		assert_eq!(view.nodes.len(), 2);
		assert_eq!(view.nodes[0].label, "Alice");
		assert_eq!(view.nodes[1].label, "bob-key");
	}

	#[test]
	fn source_without_name_falls_back() {
		let view = normalize(&[knows(Entity::new("1"), person("2", "Bob"))]);
		assert_eq!(view.nodes[0].label, FALLBACK_NODE_LABEL);
	}

	#[test]
	fn target_is_labeled_by_id_property() {
		let target = Entity::new("2").with_property("name", "Bob");
		let view = normalize(&[knows(person("1", "Alice"), target)]);
		assert_eq!(view.nodes[1].label, FALLBACK_NODE_LABEL);

		let target = Entity::new("3").with_property("id", "Artificial_Intelligence");
		let view = normalize(&[knows(person("1", "Alice"), target)]);
		assert_eq!(view.nodes[1].label, "Artificial_Intelligence");
	}

	#[test]
	fn missing_relationship_type_falls_back() {
		let record = GraphRecord::new(person("1", "a"), person("2", "b"), Relationship::default());
		let view = normalize(&[record]);
		assert_eq!(view.edges[0].label, FALLBACK_EDGE_LABEL);
	}

	#[test]
	fn falsy_properties_fall_back() {
		for value in [json!(null), json!(""), json!(0), json!(false)] {
			let view = normalize(&[knows(
				Entity::new("1").with_property("name", value),
				person("2", "b"),
			)]);
			assert_eq!(view.nodes[0].label, FALLBACK_NODE_LABEL);
		}

		let view = normalize(&[knows(
			Entity::new("1").with_property("name", 7),
			person("2", "b"),
		)]);
		assert_eq!(view.nodes[0].label, "7");
	}

	#[test]
	fn normalization_is_idempotent() {
		let records = vec![
			knows(person("1", "a"), person("2", "b")),
			knows(person("2", "b"), person("3", "c")),
			GraphRecord::new(Entity::new("3"), Entity::new("1"), Relationship::default()),
		];
		assert_eq!(normalize(&records), normalize(&records));
	}

	#[test]
	fn empty_input_gives_empty_view() {
		assert!(normalize(&[]).is_empty());
	}

	#[test]
	fn custom_config_changes_label_rule() {
		let config = NormalizerConfig {
			target_label_key: "name".into(),
			node_color: "#fff".into(),
			..NormalizerConfig::default()
		};
		let view = normalize_with(&[knows(person("1", "Alice"), person("2", "Bob"))], &config);
		assert_eq!(view.nodes[1].label, "Bob");
		assert!(view.nodes.iter().all(|n| n.color == "#fff"));
	}

	#[test]
	fn vis_shapes_serialize_with_renderer_field_names() {
		let view = normalize(&[knows(person("1", "Alice"), person("2", "Bob"))]);
		let json = serde_json::to_value(&view.edges[0]).unwrap();
		assert_eq!(
			json,
			json!({
				"from": "1",
				"to": "2",
				"label": "KNOWS",
				"color": { "color": DEFAULT_EDGE_COLOR },
				"arrows": { "to": true },
			})
		);
	}
}
