use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

use super::config::NetworkConfig;
use super::error::MountError;
use super::lifecycle::{EventListener, FrameLoop, VisibilityWatch};
use super::render;
use super::simulation::{NetworkSimulation, STEP_SECONDS};
use super::surface::Surface;
use super::types::Pointer;

const VISIBILITY_THRESHOLD: f64 = 0.05;

#[derive(Default)]
struct HostInput {
	pointer: Pointer,
	pending_size: Option<(f64, f64)>,
}

// Dropping it tears down the frame loop, the observer and every listener.
struct Mounted {
	frames: FrameLoop,
	_listeners: Vec<EventListener>,
	_visibility: Option<VisibilityWatch>,
}

impl Drop for Mounted {
	fn drop(&mut self) {
		self.frames.dispose();
		debug!("neural background torn down");
	}
}

/// Animated particle network filling its parent element (or the viewport
/// when `fullscreen`). The canvas never receives pointer events.
#[component]
pub fn NeuralBackground(
	#[prop(optional)] config: Option<NetworkConfig>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted = StoredValue::new_local(None::<Mounted>);
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if mounted.with_value(Option::is_some) {
			return;
		}
		match mount(canvas.into(), config.clone(), fullscreen) {
			Ok(m) => mounted.set_value(Some(m)),
			Err(err) => warn!("neural background disabled: {err}"),
		}
	});

	on_cleanup(move || {
		drop(mounted.try_update_value(Option::take));
	});

	let style = if fullscreen {
		"position: fixed; inset: 0; width: 100vw; height: 100vh; z-index: -1; pointer-events: none; display: block;"
	} else {
		"position: absolute; inset: 0; width: 100%; height: 100%; pointer-events: none; display: block;"
	};

	view! { <canvas node_ref=canvas_ref class="neural-background" aria-hidden="true" style=style /> }
}

fn mount(
	canvas: HtmlCanvasElement,
	config: NetworkConfig,
	fullscreen: bool,
) -> Result<Mounted, MountError> {
	let window = web_sys::window().ok_or(MountError::NoWindow)?;
	let surface = Rc::new(Surface::acquire(canvas, fullscreen)?);
	let (width, height) = surface.measure()?;
	surface.fit(width, height);

	let seed = ((js_sys::Math::random() * u32::MAX as f64) as u64) ^ ((js_sys::Date::now() as u64) << 20);
	let mut sim = NetworkSimulation::new(width, height, config, seed);
	info!(
		"neural background mounted at {}x{}: {} nodes, {} edges",
		width,
		height,
		sim.field().len(),
		sim.graph().len()
	);

	let input = Rc::new(RefCell::new(HostInput::default()));

	let (frame_surface, frame_input) = (surface.clone(), input.clone());
	let mut last_timestamp: Option<f64> = None;
	let frames = FrameLoop::new(move |timestamp| {
		let (pointer, resize) = {
			let mut input = frame_input.borrow_mut();
			(input.pointer, input.pending_size.take())
		};
		if let Some((w, h)) = resize {
			frame_surface.fit(w, h);
			sim.resize(w, h);
			debug!(
				"neural background rebuilt at {}x{} after {} ticks: {} nodes, {} edges",
				w,
				h,
				sim.ticks(),
				sim.field().len(),
				sim.graph().len()
			);
		}

		let dt = last_timestamp.map_or(STEP_SECONDS, |prev| (timestamp - prev) / 1000.0);
		last_timestamp = Some(timestamp);
		sim.tick(dt, pointer);
		render::render(&sim, frame_surface.context());
	});

	let mut listeners = Vec::new();

	let (move_surface, move_input) = (surface.clone(), input.clone());
	listeners.push(EventListener::new(&window, "mousemove", move |ev| {
		if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
			move_input.borrow_mut().pointer = move_surface.pointer_at(ev);
		}
	}));

	let (resize_surface, resize_input) = (surface.clone(), input.clone());
	listeners.push(EventListener::new(&window, "resize", move |_| {
		match resize_surface.measure() {
			Ok(size) => resize_input.borrow_mut().pending_size = Some(size),
			Err(err) => debug!("resize ignored: {err}"),
		}
	}));

	let region = surface.canvas().parent_element();
	if let Some(region) = &region {
		let leave_input = input.clone();
		listeners.push(EventListener::new(region, "mouseleave", move |_| {
			leave_input.borrow_mut().pointer = Pointer::OFF_SURFACE;
		}));
	}

	let watched = frames.clone();
	let visibility = VisibilityWatch::new(surface.canvas(), VISIBILITY_THRESHOLD, move |visible| {
		if visible && !watched.is_running() {
			debug!("neural background visible, resuming");
			watched.start();
		} else if !visible && watched.is_running() {
			debug!("neural background hidden, pausing");
			watched.stop();
		}
	});
	let visibility = match visibility {
		Ok(watch) => Some(watch),
		Err(err) => {
			debug!("animating without visibility pausing: {err}");
			None
		}
	};

	frames.start();

	Ok(Mounted {
		frames,
		_listeners: listeners,
		_visibility: visibility,
	})
}
