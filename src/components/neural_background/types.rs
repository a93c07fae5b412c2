/// Pointer position in surface pixel space.
///
/// An absent pointer is represented by [`Pointer::OFF_SURFACE`], far enough
/// outside any surface that every distance guard treats it as "no influence".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
	pub x: f64,
	pub y: f64,
}

impl Pointer {
	pub const OFF_SURFACE: Pointer = Pointer {
		x: -9999.0,
		y: -9999.0,
	};

	pub fn at(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl Default for Pointer {
	fn default() -> Self {
		Self::OFF_SURFACE
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	/// Large, slow-decaying node that the scheduler fires periodically.
	Hub,
	Relay,
	Sensor,
}

impl NodeKind {
	pub fn decay_factor(self) -> f64 {
		match self {
			NodeKind::Hub => 0.6,
			NodeKind::Relay => 0.85,
			NodeKind::Sensor => 1.0,
		}
	}

	pub fn size_range(self) -> (f64, f64) {
		match self {
			NodeKind::Hub => (4.2, 6.0),
			NodeKind::Relay => (2.4, 3.4),
			NodeKind::Sensor => (1.2, 2.4),
		}
	}
}

/// Normalised depth of a layer: 0.0 for the farthest, 1.0 for the nearest.
pub fn layer_depth(layer: usize, layer_count: usize) -> f64 {
	if layer_count <= 1 {
		return 1.0;
	}
	(layer.min(layer_count - 1) as f64) / ((layer_count - 1) as f64)
}
