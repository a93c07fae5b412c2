use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{
	Element, Event, EventTarget, IntersectionObserver, IntersectionObserverEntry,
	IntersectionObserverInit,
};

use super::error::MountError;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A self-rescheduling `requestAnimationFrame` loop. It holds a handle to
/// itself while running and must be [`dispose`](FrameLoop::dispose)d.
#[derive(Clone)]
pub struct FrameLoop {
	callback: FrameCallback,
	handle: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
	pub fn new(mut frame: impl FnMut(f64) + 'static) -> Self {
		let callback: FrameCallback = Rc::new(RefCell::new(None));
		let handle = Rc::new(Cell::new(None));
		let (callback_inner, handle_inner) = (callback.clone(), handle.clone());

		*callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			handle_inner.set(None);
			frame(timestamp);
			schedule(&callback_inner, &handle_inner);
		}));

		Self { callback, handle }
	}

	pub fn start(&self) {
		if self.handle.get().is_none() {
			schedule(&self.callback, &self.handle);
		}
	}

	pub fn stop(&self) {
		if let Some(id) = self.handle.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(id);
			}
		}
	}

	pub fn is_running(&self) -> bool {
		self.handle.get().is_some()
	}

	/// Stops the loop and drops the frame closure, breaking its self-reference.
	pub fn dispose(&self) {
		self.stop();
		self.callback.borrow_mut().take();
	}
}

fn schedule(callback: &FrameCallback, handle: &Cell<Option<i32>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(ref cb) = *callback.borrow() {
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => handle.set(Some(id)),
			Err(err) => warn!("requestAnimationFrame failed: {err:?}"),
		}
	}
}

/// A DOM event listener that is removed when dropped.
pub struct EventListener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
	pub fn new(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Self {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		if let Err(err) =
			target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
		{
			warn!("could not listen for {event}: {err:?}");
		}
		Self {
			target: target.clone(),
			event,
			callback,
		}
	}
}

impl Drop for EventListener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Reports whether an element intersects the viewport. Disconnects on drop.
pub struct VisibilityWatch {
	observer: IntersectionObserver,
	_callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl VisibilityWatch {
	pub fn new(
		target: &Element,
		threshold: f64,
		mut on_change: impl FnMut(bool) + 'static,
	) -> Result<Self, MountError> {
		let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
			move |entries: js_sys::Array, _: IntersectionObserver| {
				let latest = entries
					.iter()
					.filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
					.last();
				if let Some(entry) = latest {
					on_change(entry.is_intersecting());
				}
			},
		);

		let options = IntersectionObserverInit::new();
		options.set_threshold(&JsValue::from_f64(threshold));
		let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
			.map_err(|err| MountError::Observer(format!("{err:?}")))?;
		observer.observe(target);

		Ok(Self {
			observer,
			_callback: callback,
		})
	}
}

impl Drop for VisibilityWatch {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}
