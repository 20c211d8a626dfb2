use std::f64::consts::{FRAC_PI_2, TAU};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{EdgeInfo, ForceGraphState, NODE_RADIUS};

const BACKGROUND: &str = "#1e1e1e";
const LABEL_LANE_SPACING: f64 = 11.0;
const SELF_LOOP_RADIUS: f64 = 12.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.viewport.x, state.viewport.y);
	let _ = ctx.scale(state.viewport.k, state.viewport.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.highlight.level);
	let highlighting = state.highlight.active();
	let positions = state.positions();

	for (from, to, info) in &state.edges {
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(from), positions.get(to)) else {
			continue;
		};

		let lit = state.highlight.contains(*from) && state.highlight.contains(*to);
		let (alpha, width) = match (highlighting, lit) {
			(true, true) => (0.6 + 0.4 * t, line_width * (1.0 + 0.3 * t)),
			(true, false) => (0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t)),
			(false, _) => (0.6, line_width),
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&info.color);
		ctx.set_fill_style_str(&info.color);
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		if from == to {
			draw_self_loop(ctx, info, x1, y1, arrow_size, k);
		} else {
			draw_straight(ctx, info, (x1, y1), (x2, y2), arrow_size, k);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_straight(
	ctx: &CanvasRenderingContext2d,
	info: &EdgeInfo,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
	arrow_size: f64,
	k: f64,
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = dx.hypot(dy);
	if dist < 0.001 {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let head = if info.arrow { arrow_size } else { 0.0 };

	ctx.begin_path();
	ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
	ctx.line_to(x2 - ux * (NODE_RADIUS + head), y2 - uy * (NODE_RADIUS + head));
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if info.arrow {
		draw_arrow_head(ctx, (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS), (ux, uy), arrow_size);
	}
	draw_edge_label(ctx, info, (x1 + x2) / 2.0, (y1 + y2) / 2.0, (-uy, ux), k);
}

/// Circle above the node, passing through two points of its rim. Each lane
/// gets a larger loop.
fn draw_self_loop(
	ctx: &CanvasRenderingContext2d,
	info: &EdgeInfo,
	x: f64,
	y: f64,
	arrow_size: f64,
	k: f64,
) {
	let r = SELF_LOOP_RADIUS + info.lane as f64 * LABEL_LANE_SPACING;
	let (cx, cy) = (x, y - NODE_RADIUS - r * 0.6);
	// rim crossings sit symmetric around the bottom of the loop
	let spread = (NODE_RADIUS / r).clamp(0.1, 1.0).asin() + 0.4;
	let (start, end) = (FRAC_PI_2 + spread, FRAC_PI_2 - spread + TAU);

	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, start, end);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if info.arrow {
		let (tip_x, tip_y) = (cx + r * end.cos(), cy + r * end.sin());
		// tangent of a clockwise arc at angle a is (-sin a, cos a)
		let (ux, uy) = (-end.sin(), end.cos());
		draw_arrow_head(ctx, (tip_x, tip_y), (ux, uy), arrow_size);
	}
	// loop radius already grows with the lane, so no sideways shift
	draw_edge_label(ctx, info, cx, cy - r - 3.0, (0.0, 0.0), k);
}

fn draw_arrow_head(
	ctx: &CanvasRenderingContext2d,
	(tip_x, tip_y): (f64, f64),
	(ux, uy): (f64, f64),
	size: f64,
) {
	let (back_x, back_y) = (tip_x - ux * size, tip_y - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

/// Label at the edge midpoint, shifted sideways by its lane so parallel
/// edges do not print on top of each other.
fn draw_edge_label(
	ctx: &CanvasRenderingContext2d,
	info: &EdgeInfo,
	mx: f64,
	my: f64,
	(nx, ny): (f64, f64),
	k: f64,
) {
	if info.label.is_empty() {
		return;
	}
	let shift = info.lane as f64 * LABEL_LANE_SPACING / k.max(0.5);
	ctx.set_fill_style_str("#e0e0e0");
	ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&info.label, mx + nx * shift, my + ny * shift);
	ctx.set_text_align("start");
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let highlight = &state.highlight;
	let (t, k) = (ease_out_cubic(highlight.level), state.viewport.k);
	let font = format!("{}px sans-serif", 12.0 / k.max(0.5));

	// dimmed nodes first so highlighted ones paint over them
	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if highlight.active() && highlight.contains(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = if highlight.active() {
			(1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t))
		} else {
			(1.0, NODE_RADIUS)
		};
		let info = &node.data.user_data;

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, TAU);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_fill_style_str("#ffffff");
		ctx.set_global_alpha(alpha * 0.85);
		ctx.set_font(&font);
		let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 4.0);
		ctx.set_global_alpha(1.0);
	});

	if !highlight.active() {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !highlight.contains(idx) {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let focused = highlight.is_focus(idx);
		let (radius, glow_radius, glow_alpha) = if focused {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
				0.35 * t,
			)
		} else {
			(
				NODE_RADIUS * (1.0 + 0.2 * t),
				NODE_RADIUS * (1.4 + 0.6 * t),
				0.2 * t,
			)
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {glow_alpha})"));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, TAU);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		let info = &node.data.user_data;
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, TAU);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if focused && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, TAU);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("#ffffff");
		ctx.set_font(&font);
		let _ = ctx.fill_text(&info.label, x + radius + 3.0, y + 4.0);
	});
}
