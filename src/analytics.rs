//! Dashboard figures and the composition pie chart.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

/// Whole-graph statistics as computed by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
	pub total_nodes: u64,
	pub total_relationships: u64,
	pub graph_density: f64,
	pub avg_degree: f64,
	pub largest_component_size: u64,
}

impl AnalyticsReport {
	/// Figures shown before the first fetch completes, and kept if it fails.
	pub fn placeholder() -> Self {
		Self {
			total_nodes: 200,
			total_relationships: 350,
			graph_density: 0.03,
			avg_degree: 3.5,
			largest_component_size: 150,
		}
	}

	/// Label/value rows for the key-metrics panel.
	pub fn metric_rows(&self) -> Vec<(&'static str, String)> {
		vec![
			("Total Nodes", self.total_nodes.to_string()),
			("Total Relationships", self.total_relationships.to_string()),
			("Graph Density", format!("{:.2}", self.graph_density)),
			("Average Node Degree", format!("{:.2}", self.avg_degree)),
			(
				"Largest Connected Component Size",
				self.largest_component_size.to_string(),
			),
		]
	}

	/// Node vs relationship composition, ready for [`pie_slices`].
	pub fn composition(&self) -> [PieInput<'static>; 2] {
		[
			PieInput {
				label: "Nodes",
				value: self.total_nodes as f64,
				color: "#4caf50",
			},
			PieInput {
				label: "Relationships",
				value: self.total_relationships as f64,
				color: "#f44336",
			},
		]
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieInput<'a> {
	pub label: &'a str,
	pub value: f64,
	pub color: &'a str,
}

/// One wedge of a pie drawn in a `2r x 2r` SVG viewBox.
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
	pub label: String,
	pub color: String,
	pub fraction: f64,
	/// SVG path `d` attribute.
	pub path: String,
}

/// Lay out wedges clockwise from 12 o'clock. Zero and negative values get
/// no wedge.
pub fn pie_slices(inputs: &[PieInput<'_>], radius: f64) -> Vec<PieSlice> {
	let total: f64 = inputs.iter().map(|i| i.value.max(0.0)).sum();
	if total <= 0.0 {
		return Vec::new();
	}

	let (cx, cy) = (radius, radius);
	let point = |angle: f64| (cx + radius * angle.cos(), cy + radius * angle.sin());
	let mut start = -FRAC_PI_2;
	let mut slices = Vec::new();

	for input in inputs.iter().filter(|i| i.value > 0.0) {
		let fraction = input.value / total;
		let path = if fraction >= 1.0 {
			// a single arc cannot close on itself
			format!(
				"M {cx:.3} {:.3} A {radius:.3} {radius:.3} 0 1 1 {cx:.3} {:.3} A {radius:.3} {radius:.3} 0 1 1 {cx:.3} {:.3} Z",
				cy - radius,
				cy + radius,
				cy - radius,
			)
		} else {
			let end = start + fraction * TAU;
			let (x0, y0) = point(start);
			let (x1, y1) = point(end);
			let large_arc = u8::from(fraction > 0.5);
			format!(
				"M {cx:.3} {cy:.3} L {x0:.3} {y0:.3} A {radius:.3} {radius:.3} 0 {large_arc} 1 {x1:.3} {y1:.3} Z"
			)
		};
		start += fraction * TAU;
		slices.push(PieSlice {
			label: input.label.to_string(),
			color: input.color.to_string(),
			fraction,
			path,
		});
	}
	slices
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn input(label: &'static str, value: f64) -> PieInput<'static> {
		PieInput {
			label,
			value,
			color: "#000",
		}
	}

	#[test]
	fn report_reads_camel_case() {
		let report: AnalyticsReport = serde_json::from_value(json!({
			"totalNodes": 12,
			"totalRelationships": 30,
			"graphDensity": 0.22727,
			"avgDegree": 2.5,
			"largestComponentSize": 11
		}))
		.unwrap();
		assert_eq!(report.total_relationships, 30);
		assert_eq!(report.metric_rows()[2], ("Graph Density", "0.23".to_string()));
		assert_eq!(report.metric_rows()[3].1, "2.50");
	}

	#[test]
	fn equal_halves_split_top_to_bottom() {
		let slices = pie_slices(&[input("a", 1.0), input("b", 1.0)], 100.0);
		assert_eq!(slices.len(), 2);
		assert_eq!(
			slices[0].path,
			"M 100.000 100.000 L 100.000 0.000 A 100.000 100.000 0 0 1 100.000 200.000 Z"
		);
		assert_eq!(slices[1].fraction, 0.5);
	}

	#[test]
	fn large_wedges_set_the_large_arc_flag() {
		let slices = pie_slices(&[input("big", 3.0), input("small", 1.0)], 10.0);
		assert!(slices[0].path.contains(" 0 1 1 "));
		assert!(slices[1].path.contains(" 0 0 1 "));
		let total: f64 = slices.iter().map(|s| s.fraction).sum();
		assert!((total - 1.0).abs() < 1e-12);
	}

	#[test]
	fn single_value_draws_a_full_circle() {
		let slices = pie_slices(&[input("only", 5.0), input("none", 0.0)], 10.0);
		assert_eq!(slices.len(), 1);
		assert_eq!(slices[0].fraction, 1.0);
		assert_eq!(slices[0].path.matches(" A ").count(), 2);
	}

	#[test]
	fn empty_totals_draw_nothing() {
		assert!(pie_slices(&[input("a", 0.0), input("b", 0.0)], 10.0).is_empty());
		assert!(pie_slices(&[], 10.0).is_empty());
	}

	#[test]
	fn placeholder_composition_matches_counts() {
		let [nodes, rels] = AnalyticsReport::placeholder().composition();
		assert_eq!((nodes.value, rels.value), (200.0, 350.0));
	}
}
