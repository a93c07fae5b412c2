#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const WHITE: Rgb = Rgb::new(255, 255, 255);

	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
	}

	/// CSS `rgba()` string; alpha is clamped to [0, 1].
	pub fn rgba(self, alpha: f64) -> String {
		format!(
			"rgba({}, {}, {}, {:.3})",
			self.r,
			self.g,
			self.b,
			alpha.clamp(0.0, 1.0)
		)
	}
}

/// The two semantic palettes: cool for idle elements, hot for active ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub background: Rgb,
	pub cool: Rgb,
	pub cool_bright: Rgb,
	pub hot: Rgb,
	pub hot_bright: Rgb,
	pub hot_threshold: f64,
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			background: Rgb::new(10, 22, 40),
			cool: Rgb::new(60, 160, 255),
			cool_bright: Rgb::new(0, 242, 255),
			hot: Rgb::new(220, 38, 54),
			hot_bright: Rgb::new(255, 96, 96),
			hot_threshold: 0.45,
		}
	}
}

impl Palette {
	pub fn is_hot(&self, energy: f64) -> bool {
		energy > self.hot_threshold
	}

	pub fn tone(&self, energy: f64) -> Rgb {
		if self.is_hot(energy) { self.hot } else { self.cool }
	}

	pub fn bright_tone(&self, energy: f64) -> Rgb {
		if self.is_hot(energy) {
			self.hot_bright
		} else {
			self.cool_bright
		}
	}

	/// Smooth blend from cool to hot, centred on the hot threshold.
	pub fn blend(&self, energy: f64) -> Rgb {
		let t = (energy - self.hot_threshold) / 0.3 + 0.5;
		self.cool.lerp(self.hot, t)
	}
}
