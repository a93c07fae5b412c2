use super::palette::Palette;

/// How many nodes a surface of a given size receives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeBudget {
	Fixed(usize),
	/// One node per `area_per_node` square pixels, capped at `max_nodes`.
	Density { area_per_node: f64, max_nodes: usize },
}

impl NodeBudget {
	pub fn count_for(&self, width: f64, height: f64) -> usize {
		match *self {
			NodeBudget::Fixed(n) => n,
			NodeBudget::Density {
				area_per_node,
				max_nodes,
			} => {
				let area = width.max(0.0) * height.max(0.0);
				if area_per_node <= 0.0 || !area.is_finite() {
					return 0;
				}
				((area / area_per_node).floor() as usize).min(max_nodes)
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
	pub budget: NodeBudget,
	pub layer_count: usize,
	pub hub_count: usize,
	pub relay_fraction: f64,
	pub base_speed: f64,
	pub max_speed: f64,
	pub influence_radius: f64,
	pub repel_radius: f64,
	/// Displacement in pixels applied at the centre of the repel radius.
	pub repel_push: f64,
	pub attraction: f64,
	pub repel_boost: f64,
	pub influence_boost: f64,
	pub energy_decay: f64,
	pub jitter: f64,
	pub friction: f64,
	pub drift: f64,
	/// Spring constant pulling idle nodes back toward their spawn point.
	pub tether: f64,
	pub restitution: f64,
	pub phase_speed: (f64, f64),
	pub ring_start: f64,
	pub ring_increment: f64,
	pub ring_cutoff_factor: f64,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			budget: NodeBudget::Density {
				area_per_node: 9000.0,
				max_nodes: 300,
			},
			layer_count: 3,
			hub_count: 6,
			relay_fraction: 0.3,
			base_speed: 0.65,
			max_speed: 3.5,
			influence_radius: 220.0,
			repel_radius: 75.0,
			repel_push: 9.0,
			attraction: 0.028,
			repel_boost: 0.2,
			influence_boost: 0.07,
			energy_decay: 0.012,
			jitter: 0.03,
			friction: 0.006,
			drift: 0.004,
			tether: 0.00004,
			restitution: 0.85,
			phase_speed: (0.016, 0.038),
			ring_start: 1.0,
			ring_increment: 0.9,
			ring_cutoff_factor: 9.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Connection distance as a fraction of the smaller surface dimension.
	pub connection_factor: f64,
	pub max_connection_distance: f64,
	pub edge_keep_probability: f64,
	pub activation_threshold: f64,
	pub pulse_probability: f64,
	pub pulse_speed: (f64, f64),
	pub pulse_boost: f64,
	pub flow_speed: (f64, f64),
	pub fire_interval: u64,
	pub fire_energy: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			connection_factor: 0.28,
			max_connection_distance: 190.0,
			edge_keep_probability: 0.6,
			activation_threshold: 0.5,
			pulse_probability: 0.03,
			pulse_speed: (0.012, 0.03),
			pulse_boost: 0.45,
			flow_speed: (0.2, 0.6),
			fire_interval: 180,
			fire_energy: 1.0,
		}
	}
}

impl GraphConfig {
	pub fn connection_distance(&self, width: f64, height: f64) -> f64 {
		(width.min(height).max(0.0) * self.connection_factor).min(self.max_connection_distance)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
	pub palette: Palette,
	/// Alpha of the background fill each frame; below 1.0 leaves an afterimage.
	pub trail_alpha: f64,
	pub glow_count: usize,
	pub grid_spacing: Option<f64>,
	pub vignette: bool,
	pub hexagon_hubs: bool,
	pub dashed_edges: bool,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			palette: Palette::default(),
			trail_alpha: 0.35,
			glow_count: 2,
			grid_spacing: Some(48.0),
			vignette: true,
			hexagon_hubs: true,
			dashed_edges: true,
		}
	}
}

/// Complete, static configuration of one background instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkConfig {
	pub field: FieldConfig,
	pub graph: GraphConfig,
	pub render: RenderConfig,
}
