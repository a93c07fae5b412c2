use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::error::MountError;
use super::types::Pointer;

/// A canvas together with its 2D context, sized to its host region.
pub struct Surface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	fullscreen: bool,
}

impl Surface {
	pub fn acquire(canvas: HtmlCanvasElement, fullscreen: bool) -> Result<Self, MountError> {
		let ctx = canvas
			.get_context("2d")
			.map_err(|err| MountError::ContextRejected(format!("{err:?}")))?
			.ok_or(MountError::NoContext)?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| MountError::WrongContextType)?;
		Ok(Self {
			canvas,
			ctx,
			fullscreen,
		})
	}

	pub fn canvas(&self) -> &HtmlCanvasElement {
		&self.canvas
	}

	pub fn context(&self) -> &CanvasRenderingContext2d {
		&self.ctx
	}

	/// Current size of the region the canvas should fill: the viewport in
	/// fullscreen mode, otherwise the parent element.
	pub fn measure(&self) -> Result<(f64, f64), MountError> {
		if self.fullscreen {
			let window = web_sys::window().ok_or(MountError::NoWindow)?;
			let width = window.inner_width().ok().and_then(|v| v.as_f64());
			let height = window.inner_height().ok().and_then(|v| v.as_f64());
			return width.zip(height).ok_or(MountError::NoWindow);
		}
		let parent = self.canvas.parent_element().ok_or(MountError::NoParent)?;
		Ok((parent.client_width() as f64, parent.client_height() as f64))
	}

	/// Resizes the backing store; this also clears the canvas.
	pub fn fit(&self, width: f64, height: f64) {
		self.canvas.set_width(width.max(0.0) as u32);
		self.canvas.set_height(height.max(0.0) as u32);
	}

	pub fn pointer_at(&self, ev: &MouseEvent) -> Pointer {
		let rect = self.canvas.get_bounding_client_rect();
		Pointer::at(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}
}
