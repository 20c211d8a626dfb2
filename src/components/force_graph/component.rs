use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{ForceGraphState, Pointer};
use crate::graph::GraphView;

type Shared<T> = Rc<RefCell<T>>;

const FRAME_SECONDS: f32 = 0.016;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Empty a self-referencing slot so the cycle through it is broken.
fn release<T>(slot: &RefCell<Option<T>>) -> Option<T> {
	slot.borrow_mut().take()
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

/// Canvas that lays out a [`GraphView`] with a force simulation.
///
/// Drag nodes to pin them, drag the background to pan, scroll to zoom,
/// double-click to pause or resume the layout.
/// Hovering a node highlights it and its neighbours. A new view replaces the
/// simulation but keeps the camera.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphView>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Shared<Option<ForceGraphState>> = Rc::default();
	let frame: Shared<Option<Closure<dyn FnMut()>>> = Rc::default();
	let on_resize: Shared<Option<Closure<dyn FnMut()>>> = Rc::default();
	let alive = Rc::new(Cell::new(true));

	let (state_fx, frame_fx, resize_fx, alive_fx) =
		(state.clone(), frame.clone(), on_resize.clone(), alive.clone());
	Effect::new(move |_| {
		let view = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if let Some(s) = state_fx.borrow_mut().as_mut() {
			let viewport = s.viewport.clone();
			*s = ForceGraphState::new(&view, s.width, s.height);
			s.viewport = viewport;
			return;
		}

		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let (pw, ph) = parent_size(&canvas);
			(width.unwrap_or(pw), height.unwrap_or(ph))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("canvas has no 2d context");
			return;
		};
		*state_fx.borrow_mut() = Some(ForceGraphState::new(&view, w, h));

		if fullscreen {
			let (state_rs, canvas_rs, alive_rs) = (state_fx.clone(), canvas.clone(), alive_fx.clone());
			*resize_fx.borrow_mut() = Some(Closure::new(move || {
				if !alive_rs.get() {
					return;
				}
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_rs.set_width(nw as u32);
				canvas_rs.set_height(nh as u32);
				if let Some(s) = state_rs.borrow_mut().as_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(cb) = resize_fx.borrow().as_ref() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_af, frame_af, alive_af) = (state_fx.clone(), frame_fx.clone(), alive_fx.clone());
		*frame_fx.borrow_mut() = Some(Closure::new(move || {
			if !alive_af.get() {
				// last frame: release the loop so its state can be dropped
				drop(release(&frame_af));
				return;
			}
			if let Some(s) = state_af.borrow_mut().as_mut() {
				s.tick(FRAME_SECONDS);
				render::render(s, &ctx);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), frame_af.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = frame_fx.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let teardown = SendWrapper::new((alive, on_resize));
	on_cleanup(move || {
		let (alive, on_resize) = teardown.take();
		alive.set(false);
		let listener = release(&on_resize);
		if let (Some(window), Some(cb)) = (web_sys::window(), listener) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	let local_point = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_down = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		if let Some(s) = state_down.borrow_mut().as_mut() {
			let grabbed = s
				.node_at(x, y)
				.and_then(|node| Some((node, s.node_position(node)?)));
			s.pointer = match grabbed {
				Some((node, origin)) => Pointer::Dragging {
					node,
					grab: (x, y),
					origin,
				},
				None => Pointer::Panning {
					grab: (x, y),
					origin: (s.viewport.x, s.viewport.y),
				},
			};
		}
	};

	let state_move = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		let mut guard = state_move.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		match s.pointer.clone() {
			Pointer::Idle => {
				let hovered = s.node_at(x, y);
				s.hover(hovered);
			}
			Pointer::Dragging { node, grab, origin } => {
				let k = s.viewport.k;
				s.pin_node(
					node,
					origin.0 + ((x - grab.0) / k) as f32,
					origin.1 + ((y - grab.1) / k) as f32,
				);
			}
			Pointer::Panning { grab, origin } => {
				s.viewport.x = origin.0 + (x - grab.0);
				s.viewport.y = origin.1 + (y - grab.1);
			}
		}
	};

	let state_up = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(s) = state_up.borrow_mut().as_mut() {
			s.pointer = Pointer::Idle;
		}
	};

	let state_leave = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state_leave.borrow_mut().as_mut() {
			s.pointer = Pointer::Idle;
			s.hover(None);
		}
	};

	let state_dbl = state.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(s) = state_dbl.borrow_mut().as_mut() {
			s.running = !s.running;
			log::debug!("layout {}", if s.running { "resumed" } else { "paused" });
		}
	};

	let state_wheel = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = local_point(mouse) else {
			return;
		};
		if let Some(s) = state_wheel.borrow_mut().as_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.viewport.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
