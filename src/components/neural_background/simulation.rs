use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::NetworkConfig;
use super::field::NodeField;
use super::graph::{GraphStep, RelationshipGraph};
use super::types::Pointer;

pub const STEP_SECONDS: f64 = 1.0 / 60.0;

// Steps run at most per tick; longer stalls are dropped, not replayed.
const MAX_CATCH_UP: u32 = 4;

/// All randomness comes from a seeded generator, so two simulations built
/// with the same seed and driven by the same inputs evolve identically.
pub struct NetworkSimulation {
	config: NetworkConfig,
	field: NodeField,
	graph: RelationshipGraph,
	rng: ChaCha8Rng,
	ticks: u64,
	time: f64,
	accumulator: f64,
}

impl NetworkSimulation {
	pub fn new(width: f64, height: f64, config: NetworkConfig, seed: u64) -> Self {
		let mut rng = ChaCha8Rng::seed_from_u64(seed);
		let field = NodeField::generate(width, height, &config.field, &mut rng);
		let graph = RelationshipGraph::build(&field, &config.graph, &mut rng);
		Self {
			config,
			field,
			graph,
			rng,
			ticks: 0,
			time: 0.0,
			accumulator: 0.0,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.field = NodeField::generate(width, height, &self.config.field, &mut self.rng);
		self.graph = RelationshipGraph::build(&self.field, &self.config.graph, &mut self.rng);
		self.accumulator = 0.0;
	}

	pub fn step(&mut self, pointer: Pointer) -> GraphStep {
		self.field.step(pointer, &self.config.field, &mut self.rng);
		let report = self.graph.step(
			&mut self.field,
			&self.config.graph,
			self.config.field.ring_start,
			&mut self.rng,
		);
		self.ticks += 1;
		report
	}

	/// Advances the clock by `dt` seconds and runs the whole steps that fit.
	/// Returns the number of steps taken.
	pub fn tick(&mut self, dt: f64, pointer: Pointer) -> u32 {
		if !dt.is_finite() || dt <= 0.0 {
			return 0;
		}
		self.time += dt;
		self.accumulator = (self.accumulator + dt).min(STEP_SECONDS * MAX_CATCH_UP as f64);

		let steps = (self.accumulator / STEP_SECONDS).floor() as u32;
		self.accumulator = (self.accumulator - steps as f64 * STEP_SECONDS).max(0.0);
		for _ in 0..steps {
			self.step(pointer);
		}
		steps
	}

	pub fn config(&self) -> &NetworkConfig {
		&self.config
	}

	pub fn field(&self) -> &NodeField {
		&self.field
	}

	pub fn graph(&self) -> &RelationshipGraph {
		&self.graph
	}

	pub fn width(&self) -> f64 {
		self.field.width()
	}

	pub fn height(&self) -> f64 {
		self.field.height()
	}

	/// Seconds of simulated wall time, used for time-driven decoration.
	pub fn time(&self) -> f64 {
		self.time
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}
}
