use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::graph::GraphView;

const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 7.0;
pub const HIT_RADIUS: f64 = 12.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub label: String,
	pub color: String,
}

#[derive(Clone, Debug, Default)]
pub struct EdgeInfo {
	pub label: String,
	pub color: String,
	pub arrow: bool,
	/// Position among the edges joining the same pair, used to fan out labels.
	pub lane: usize,
}

/// Screen-space offset and zoom of the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Viewport {
	pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Zoom by `factor` keeping the world point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

/// What the primary mouse button is doing.
#[derive(Clone, Debug, Default)]
pub enum Pointer {
	#[default]
	Idle,
	Dragging {
		node: DefaultNodeIdx,
		grab: (f64, f64),
		origin: (f32, f32),
	},
	Panning {
		grab: (f64, f64),
		origin: (f64, f64),
	},
}

/// Hovered node, its neighbours, and the fade level of the highlight.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
	pub focus: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	/// Focus being faded out after the pointer left it.
	fading: Option<(DefaultNodeIdx, HashSet<DefaultNodeIdx>)>,
	pub level: f64,
	delay: f64,
}

impl Highlight {
	pub fn active(&self) -> bool {
		self.focus.is_some() || self.fading.is_some()
	}

	pub fn is_focus(&self, idx: DefaultNodeIdx) -> bool {
		self.focus == Some(idx) || self.fading.as_ref().is_some_and(|(f, _)| *f == idx)
	}

	pub fn is_neighbor(&self, idx: DefaultNodeIdx) -> bool {
		self.neighbors.contains(&idx)
			|| self.fading.as_ref().is_some_and(|(_, n)| n.contains(&idx))
	}

	pub fn contains(&self, idx: DefaultNodeIdx) -> bool {
		self.is_focus(idx) || self.is_neighbor(idx)
	}

	fn step(&mut self, dt: f64) {
		const DELAY: f64 = 0.08;
		if self.focus.is_some() {
			self.delay = (self.delay + dt).min(DELAY);
			if self.delay >= DELAY {
				self.level += (1.0 - self.level) * 1.8 * dt;
			}
		} else {
			self.level -= self.level * 1.26 * dt;
			if self.level < 0.01 {
				self.level = 0.0;
				self.fading = None;
			}
		}
	}
}

pub struct ForceGraphState {
	/// Layout only: holds one spring per connected pair of nodes.
	pub graph: ForceGraph<NodeInfo, ()>,
	/// Every relationship to draw, in view order, with its direction intact.
	pub edges: Vec<(DefaultNodeIdx, DefaultNodeIdx, EdgeInfo)>,
	pub viewport: Viewport,
	pub pointer: Pointer,
	pub highlight: Highlight,
	pub width: f64,
	pub height: f64,
	pub running: bool,
	pub flow_time: f64,
	adjacency: HashMap<DefaultNodeIdx, HashSet<DefaultNodeIdx>>,
}

impl ForceGraphState {
	pub fn new(view: &GraphView, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 250.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut index = HashMap::with_capacity(view.nodes.len());
		let count = view.nodes.len().max(1) as f64;

		for (i, node) in view.nodes.iter().enumerate() {
			let angle = i as f64 * TAU / count;
			let color = if node.color.is_empty() {
				PALETTE[i % PALETTE.len()].to_string()
			} else {
				node.color.clone()
			};
			let idx = graph.add_node(NodeData {
				x: (width / 2.0 + 120.0 * angle.cos()) as f32,
				y: (height / 2.0 + 120.0 * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					label: node.label.clone(),
					color,
				},
			});
			index.insert(node.id.as_str(), idx);
		}

		let mut adjacency: HashMap<DefaultNodeIdx, HashSet<DefaultNodeIdx>> = HashMap::new();
		let mut lanes: HashMap<(DefaultNodeIdx, DefaultNodeIdx), usize> = HashMap::new();
		let mut edges = Vec::with_capacity(view.edges.len());
		let mut skipped = 0usize;

		for edge in &view.edges {
			let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
			else {
				skipped += 1;
				continue;
			};
			let pair = if from <= to { (from, to) } else { (to, from) };
			let lane = lanes.entry(pair).or_default();
			if *lane == 0 && from != to {
				graph.add_edge(from, to, EdgeData::default());
			}
			edges.push((
				from,
				to,
				EdgeInfo {
					label: edge.label.clone(),
					color: edge.color.color.clone(),
					arrow: edge.arrows.to,
					lane: *lane,
				},
			));
			*lane += 1;
			adjacency.entry(from).or_default().insert(to);
			adjacency.entry(to).or_default().insert(from);
		}
		if skipped > 0 {
			log::warn!("{skipped} edges reference unknown nodes and were not drawn");
		}

		Self {
			graph,
			edges,
			viewport: Viewport {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			pointer: Pointer::Idle,
			highlight: Highlight::default(),
			width,
			height,
			running: true,
			flow_time: 0.0,
			adjacency,
		}
	}

	pub fn node_at(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.viewport.to_world(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if dx.hypot(dy) < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Current position of every node, keyed by index.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut position = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				position = Some((node.x(), node.y()));
			}
		});
		position
	}

	/// Move a node and pin it where it was dropped.
	pub fn pin_node(&mut self, idx: DefaultNodeIdx, x: f32, y: f32) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = x;
				node.data.y = y;
				node.data.is_anchor = true;
			}
		});
	}

	pub fn hover(&mut self, node: Option<DefaultNodeIdx>) {
		let h = &mut self.highlight;
		if h.focus == node {
			return;
		}
		let was_focused = h.focus.is_some();
		h.fading = match (h.focus.take(), node) {
			(Some(prev), None) => Some((prev, std::mem::take(&mut h.neighbors))),
			_ => None,
		};
		h.neighbors = node
			.and_then(|idx| self.adjacency.get(&idx).cloned())
			.unwrap_or_default();
		h.focus = node;
		if node.is_some() && !was_focused {
			h.delay = 0.0;
		}
	}

	pub fn tick(&mut self, dt: f32) {
		if self.running {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;
		self.highlight.step(dt as f64);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Entity, GraphRecord, Relationship, normalize};

	fn view() -> GraphView {
		let e = |id: &str| Entity::new(id).with_property("name", id).with_property("id", id);
		normalize(&[
			GraphRecord::new(e("a"), e("b"), Relationship::typed("KNOWS")),
			GraphRecord::new(e("a"), e("b"), Relationship::typed("LIKES")),
			GraphRecord::new(e("b"), e("c"), Relationship::default()),
		])
	}

	fn labels_and_lanes(state: &ForceGraphState) -> Vec<(String, usize)> {
		let mut out: Vec<_> = state
			.edges
			.iter()
			.map(|(_, _, info)| (info.label.clone(), info.lane))
			.collect();
		out.sort();
		out
	}

	fn springs(state: &ForceGraphState) -> usize {
		let mut count = 0;
		state.graph.visit_edges(|_, _, _| count += 1);
		count
	}

	fn label_of(state: &ForceGraphState, idx: DefaultNodeIdx) -> String {
		let mut label = String::new();
		state.graph.visit_nodes(|node| {
			if node.index() == idx {
				label = node.data.user_data.label.clone();
			}
		});
		label
	}

	#[test]
	fn parallel_edges_get_distinct_lanes() {
		let state = ForceGraphState::new(&view(), 800.0, 600.0);
		assert_eq!(
			labels_and_lanes(&state),
			[
				("KNOWS".to_string(), 0),
				("LIKES".to_string(), 1),
				("REL".to_string(), 0)
			]
		);
		assert_eq!(springs(&state), 2);
	}

	#[test]
	fn reverse_edges_keep_their_direction() {
		let e = |id: &str| Entity::new(id).with_property("name", id).with_property("id", id);
		let view = normalize(&[
			GraphRecord::new(e("a"), e("b"), Relationship::typed("KNOWS")),
			GraphRecord::new(e("b"), e("a"), Relationship::typed("FOLLOWS")),
		]);
		let state = ForceGraphState::new(&view, 800.0, 600.0);

		let drawn: Vec<_> = state
			.edges
			.iter()
			.map(|(from, to, info)| {
				(label_of(&state, *from), label_of(&state, *to), info.label.clone(), info.lane)
			})
			.collect();
		assert_eq!(
			drawn,
			[
				("a".to_string(), "b".to_string(), "KNOWS".to_string(), 0),
				("b".to_string(), "a".to_string(), "FOLLOWS".to_string(), 1),
			]
		);
		assert_eq!(springs(&state), 1);
	}

	#[test]
	fn self_loops_are_drawn_without_a_spring() {
		let e = Entity::new("n").with_property("name", "n").with_property("id", "n");
		let view = normalize(&[GraphRecord::new(e.clone(), e, Relationship::typed("SELF"))]);
		let state = ForceGraphState::new(&view, 800.0, 600.0);

		assert_eq!(state.edges.len(), 1);
		let (from, to, info) = &state.edges[0];
		assert_eq!(from, to);
		assert_eq!(info.label, "SELF");
		assert_eq!(springs(&state), 0);
		assert_eq!(state.positions().len(), 1);
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let mut view = view();
		view.edges[0].to = "missing".into();
		let state = ForceGraphState::new(&view, 800.0, 600.0);
		assert_eq!(labels_and_lanes(&state).len(), 2);
	}

	#[test]
	fn zoom_keeps_anchor_point_fixed() {
		let mut viewport = Viewport {
			x: 10.0,
			y: -5.0,
			k: 1.0,
		};
		let before = viewport.to_world(200.0, 150.0);
		viewport.zoom_at(200.0, 150.0, 1.1);
		let after = viewport.to_world(200.0, 150.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);

		viewport.zoom_at(0.0, 0.0, 1e6);
		assert_eq!(viewport.k, MAX_ZOOM);
	}
}
