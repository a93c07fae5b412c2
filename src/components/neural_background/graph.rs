use rand::Rng;

use super::config::GraphConfig;
use super::field::NodeField;
use super::types::NodeKind;

/// `Edge::pulse` value when no pulse is in flight.
pub const NO_PULSE: f64 = -1.0;

// Multiple of the renderer's dash pattern length.
const DASH_WRAP: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Lower endpoint index; always `a < b`.
	pub a: usize,
	pub b: usize,
	pub layer: usize,
	pub active: bool,
	/// Linear distance fade, 1.0 at zero distance and 0.0 at the threshold.
	pub strength: f64,
	/// Progress of the in-flight pulse in [0, 1), or [`NO_PULSE`].
	pub pulse: f64,
	pub pulse_from: usize,
	pub pulse_speed: f64,
	pub dash_offset: f64,
	pub flow_speed: f64,
}

impl Edge {
	pub fn new(a: usize, b: usize, layer: usize, pulse_speed: f64, flow_speed: f64) -> Self {
		let (a, b) = if a <= b { (a, b) } else { (b, a) };
		Self {
			a,
			b,
			layer,
			active: false,
			strength: 0.0,
			pulse: NO_PULSE,
			pulse_from: a,
			pulse_speed,
			dash_offset: 0.0,
			flow_speed,
		}
	}

	#[cfg(test)]
	pub fn endpoints(&self) -> (usize, usize) {
		(self.a, self.b)
	}

	pub fn has_pulse(&self) -> bool {
		self.pulse >= 0.0
	}

	pub fn pulse_target(&self) -> usize {
		if self.pulse_from == self.a {
			self.b
		} else {
			self.a
		}
	}

	fn refresh(&mut self, distance: f64, max_distance: f64) {
		self.active = distance < max_distance;
		self.strength = if self.active {
			1.0 - distance / max_distance
		} else {
			0.0
		};
	}
}

/// Fires a hub every `interval` ticks. An interval of 0 never fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubScheduler {
	interval: u64,
	elapsed: u64,
}

impl HubScheduler {
	pub fn new(interval: u64) -> Self {
		Self {
			interval,
			elapsed: 0,
		}
	}

	pub fn advance(&mut self) -> bool {
		if self.interval == 0 {
			return false;
		}
		self.elapsed += 1;
		if self.elapsed >= self.interval {
			self.elapsed = 0;
			return true;
		}
		false
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStep {
	pub pulses_started: usize,
	pub pulses_delivered: usize,
	pub hub_fired: Option<usize>,
}

/// Fixed set of edges over a [`NodeField`] plus the signals travelling on them.
#[derive(Clone, Debug)]
pub struct RelationshipGraph {
	edges: Vec<Edge>,
	hubs: Vec<usize>,
	max_distance: f64,
	scheduler: HubScheduler,
}

impl RelationshipGraph {
	/// All-pairs pass; node counts are capped so the quadratic cost
	/// stays bounded.
	pub fn build<R: Rng + ?Sized>(field: &NodeField, config: &GraphConfig, rng: &mut R) -> Self {
		let max_distance = config.connection_distance(field.width(), field.height());
		let keep = config.edge_keep_probability.clamp(0.0, 1.0);
		let nodes = field.nodes();
		let mut edges = Vec::new();

		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let distance = field.distance(i, j);
				if distance >= max_distance || !rng.gen_bool(keep) {
					continue;
				}
				let mut edge = Edge::new(
					i,
					j,
					nodes[i].layer.min(nodes[j].layer),
					sample(config.pulse_speed, rng).max(1e-3),
					sample(config.flow_speed, rng),
				);
				edge.refresh(distance, max_distance);
				edges.push(edge);
			}
		}

		let hubs = nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.kind == NodeKind::Hub)
			.map(|(i, _)| i)
			.collect();

		Self {
			edges,
			hubs,
			max_distance,
			scheduler: HubScheduler::new(config.fire_interval),
		}
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn len(&self) -> usize {
		self.edges.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}

	#[cfg(test)]
	pub fn max_distance(&self) -> f64 {
		self.max_distance
	}

	pub fn step<R: Rng + ?Sized>(
		&mut self,
		field: &mut NodeField,
		config: &GraphConfig,
		ring_start: f64,
		rng: &mut R,
	) -> GraphStep {
		let mut report = GraphStep::default();
		let probability = config.pulse_probability.clamp(0.0, 1.0);

		for edge in &mut self.edges {
			edge.refresh(field.distance(edge.a, edge.b), self.max_distance);
			if edge.active {
				edge.dash_offset = (edge.dash_offset + edge.flow_speed).rem_euclid(DASH_WRAP);
			}

			if edge.has_pulse() {
				edge.pulse += edge.pulse_speed;
				if edge.pulse >= 1.0 {
					edge.pulse = NO_PULSE;
					let (source, target) = (edge.pulse_from, edge.pulse_target());
					let nodes = field.nodes_mut();
					let receiver = if nodes[source].energy < nodes[target].energy {
						source
					} else {
						target
					};
					nodes[receiver].energize(config.pulse_boost);
					nodes[receiver].trigger_scan(ring_start);
					report.pulses_delivered += 1;
				}
			} else if edge.active {
				let nodes = field.nodes();
				let (ea, eb) = (nodes[edge.a].energy, nodes[edge.b].energy);
				if ea.max(eb) > config.activation_threshold && rng.gen_bool(probability) {
					edge.pulse = 0.0;
					edge.pulse_from = if ea >= eb { edge.a } else { edge.b };
					report.pulses_started += 1;
				}
			}
		}

		if self.scheduler.advance() {
			report.hub_fired = self.fire_hub(field, config, ring_start, rng);
		}
		report
	}

	fn fire_hub<R: Rng + ?Sized>(
		&self,
		field: &mut NodeField,
		config: &GraphConfig,
		ring_start: f64,
		rng: &mut R,
	) -> Option<usize> {
		if self.hubs.is_empty() {
			return None;
		}
		let hub = self.hubs[rng.gen_range(0..self.hubs.len())];
		let node = field.nodes_mut().get_mut(hub)?;
		node.excite(config.fire_energy);
		node.trigger_scan(ring_start);
		Some(hub)
	}
}

fn sample<R: Rng + ?Sized>((lo, hi): (f64, f64), rng: &mut R) -> f64 {
	if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	use super::*;
	use crate::components::neural_background::config::FieldConfig;
	use crate::components::neural_background::field::Node;
	use crate::components::neural_background::types::Pointer;

	fn rng() -> ChaCha8Rng {
		ChaCha8Rng::seed_from_u64(11)
	}

	fn eager() -> GraphConfig {
		GraphConfig {
			edge_keep_probability: 1.0,
			pulse_probability: 1.0,
			pulse_speed: (0.02, 0.02),
			fire_interval: 0,
			..GraphConfig::default()
		}
	}

	fn pair(distance: f64) -> NodeField {
		NodeField::from_nodes(
			800.0,
			600.0,
			vec![
				Node::new(100.0, 100.0, NodeKind::Relay, 1),
				Node::new(100.0 + distance, 100.0, NodeKind::Sensor, 2),
			],
		)
	}

	#[test]
	fn build_connects_only_close_pairs() {
		let config = eager();
		let near = RelationshipGraph::build(&pair(50.0), &config, &mut rng());
		assert_eq!(near.len(), 1);
		let edge = &near.edges()[0];
		assert_eq!(edge.endpoints(), (0, 1));
		assert_eq!(edge.layer, 1);
		assert!(edge.active);
		assert!(!edge.has_pulse());

		let far = RelationshipGraph::build(&pair(400.0), &config, &mut rng());
		assert!(far.is_empty());
	}

	#[test]
	fn edge_new_orders_endpoints() {
		assert_eq!(Edge::new(5, 2, 0, 0.1, 0.1).endpoints(), (2, 5));
	}

	#[test]
	fn quiet_nodes_start_no_pulses() {
		let config = eager();
		let mut field = pair(50.0);
		let mut graph = RelationshipGraph::build(&field, &config, &mut rng());
		let report = graph.step(&mut field, &config, 1.0, &mut rng());
		assert_eq!(report.pulses_started, 0);
		assert!(!graph.edges()[0].has_pulse());
	}

	#[test]
	fn pulse_delivers_exactly_once() {
		let config = eager();
		let mut r = rng();
		let mut field = pair(50.0);
		field.nodes_mut()[0].energy = 1.0;
		let mut graph = RelationshipGraph::build(&field, &config, &mut r);

		let report = graph.step(&mut field, &config, 1.0, &mut r);
		assert_eq!(report.pulses_started, 1);
		assert_eq!(graph.edges()[0].pulse_from, 0);
		assert_eq!(graph.edges()[0].pulse_target(), 1);
		field.nodes_mut()[0].energy = 0.0;

		let bound = (1.0 / 0.02_f64).ceil() as usize + 1;
		let mut delivered_at = None;
		for tick in 0..bound {
			let before = field.nodes()[1].energy;
			let report = graph.step(&mut field, &config, 1.0, &mut r);
			if report.pulses_delivered > 0 {
				assert_eq!(report.pulses_delivered, 1);
				assert!(field.nodes()[1].energy > before);
				assert!(field.nodes()[1].scan_ring > 0.0);
				assert_eq!(graph.edges()[0].pulse, NO_PULSE);
				delivered_at = Some(tick);
				break;
			}
			let progress = graph.edges()[0].pulse;
			assert!((0.0..1.0).contains(&progress));
		}
		assert!(delivered_at.is_some(), "pulse never arrived");

		for _ in 0..200 {
			let report = graph.step(&mut field, &config, 1.0, &mut r);
			assert_eq!(report.pulses_delivered, 0);
		}
	}

	#[test]
	fn inactive_edge_starts_nothing_but_survives() {
		let config = eager();
		let mut field = pair(50.0);
		let mut graph = RelationshipGraph::build(&field, &config, &mut rng());

		field.nodes_mut()[1].x = 700.0;
		field.nodes_mut()[0].energy = 1.0;
		let report = graph.step(&mut field, &config, 1.0, &mut rng());

		assert_eq!(report.pulses_started, 0);
		assert_eq!(graph.len(), 1);
		assert!(!graph.edges()[0].active);
		assert_eq!(graph.edges()[0].strength, 0.0);
	}

	#[test]
	fn scheduler_fires_on_interval() {
		let mut scheduler = HubScheduler::new(180);
		let fired = (0..540).filter(|_| scheduler.advance()).count();
		assert_eq!(fired, 3);

		let mut never = HubScheduler::new(0);
		assert!((0..1000).all(|_| !never.advance()));
	}

	#[test]
	fn hub_firing_energizes_a_hub() {
		let field_config = FieldConfig::default();
		let config = GraphConfig {
			fire_interval: 10,
			pulse_probability: 0.0,
			..GraphConfig::default()
		};
		let mut r = rng();
		let mut field = NodeField::generate(800.0, 600.0, &field_config, &mut r);
		let mut graph = RelationshipGraph::build(&field, &config, &mut r);

		let mut fired = Vec::new();
		for _ in 0..30 {
			if let Some(hub) = graph.step(&mut field, &config, 1.0, &mut r).hub_fired {
				fired.push(hub);
				let node = &field.nodes()[hub];
				assert_eq!(node.kind, NodeKind::Hub);
				assert_eq!(node.energy, 1.0);
				assert!(node.scan_ring > 0.0);
			}
		}
		assert_eq!(fired.len(), 3);
	}

	#[test]
	fn ticking_never_changes_the_edge_set() {
		let field_config = FieldConfig::default();
		let config = GraphConfig::default();
		let mut r = rng();
		let mut field = NodeField::generate(800.0, 600.0, &field_config, &mut r);
		let mut graph = RelationshipGraph::build(&field, &config, &mut r);
		let before: Vec<_> = graph.edges().iter().map(Edge::endpoints).collect();
		assert!(!before.is_empty());

		for tick in 0..600 {
			let pointer = Pointer::at(tick as f64 % 800.0, 300.0);
			field.step(pointer, &field_config, &mut r);
			graph.step(&mut field, &config, field_config.ring_start, &mut r);
			for n in field.nodes() {
				assert!((0.0..=1.0).contains(&n.energy));
			}
		}

		let after: Vec<_> = graph.edges().iter().map(Edge::endpoints).collect();
		assert_eq!(before, after);
	}
}
