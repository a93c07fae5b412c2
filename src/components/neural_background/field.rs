use std::f64::consts::TAU;

use rand::Rng;

use super::config::FieldConfig;
use super::types::{NodeKind, Pointer, layer_depth};

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub home_x: f64,
	pub home_y: f64,
	pub size: f64,
	pub kind: NodeKind,
	pub layer: usize,
	pub energy: f64,
	pub decay: f64,
	pub phase: f64,
	pub phase_speed: f64,
	pub scan_ring: f64,
}

impl Node {
	#[cfg(test)]
	pub fn new(x: f64, y: f64, kind: NodeKind, layer: usize) -> Self {
		let (lo, hi) = kind.size_range();
		Self {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			home_x: x,
			home_y: y,
			size: (lo + hi) / 2.0,
			kind,
			layer,
			energy: 0.0,
			decay: 0.0,
			phase: 0.0,
			phase_speed: 0.02,
			scan_ring: 0.0,
		}
	}

	pub fn energize(&mut self, amount: f64) {
		self.energy = (self.energy + amount).clamp(0.0, 1.0);
	}

	pub fn excite(&mut self, level: f64) {
		self.energy = self.energy.max(level).clamp(0.0, 1.0);
	}

	pub fn trigger_scan(&mut self, start: f64) {
		if self.scan_ring <= 0.0 {
			self.scan_ring = start.max(f64::MIN_POSITIVE);
		}
	}

	pub fn speed(&self) -> f64 {
		self.vx.hypot(self.vy)
	}

	fn clamp_speed(&mut self, max: f64) {
		let speed = self.speed();
		if speed > max && speed > 0.0 {
			self.vx = self.vx / speed * max;
			self.vy = self.vy / speed * max;
		}
	}

	fn advance_scan(&mut self, increment: f64, cutoff_factor: f64) {
		if self.scan_ring <= 0.0 {
			return;
		}
		self.scan_ring += increment;
		if self.scan_ring > self.size * cutoff_factor {
			self.scan_ring = 0.0;
		}
	}

	fn reflect(&mut self, width: f64, height: f64, restitution: f64) {
		if self.x < 0.0 {
			self.x = 0.0;
			self.vx = self.vx.abs() * restitution;
		} else if self.x > width {
			self.x = width;
			self.vx = -self.vx.abs() * restitution;
		}
		if self.y < 0.0 {
			self.y = 0.0;
			self.vy = self.vy.abs() * restitution;
		} else if self.y > height {
			self.y = height;
			self.vy = -self.vy.abs() * restitution;
		}
	}
}

/// The simulated particles of one surface.
#[derive(Clone, Debug, Default)]
pub struct NodeField {
	nodes: Vec<Node>,
	width: f64,
	height: f64,
}

impl NodeField {
	/// The first `hub_count` nodes are hubs on the nearest layer, followed by
	/// `relay_fraction` of the population as relays; the rest are sensors
	/// spread uniformly over the layers.
	pub fn generate<R: Rng + ?Sized>(
		width: f64,
		height: f64,
		config: &FieldConfig,
		rng: &mut R,
	) -> Self {
		let (width, height) = (width.max(0.0), height.max(0.0));
		let count = config.budget.count_for(width, height);
		let layers = config.layer_count.max(1);
		let hubs = config.hub_count.min(count);
		let relays = ((count as f64 * config.relay_fraction).round() as usize).min(count - hubs);

		let nodes = (0..count)
			.map(|i| {
				let kind = if i < hubs {
					NodeKind::Hub
				} else if i < hubs + relays {
					NodeKind::Relay
				} else {
					NodeKind::Sensor
				};
				let layer = match kind {
					NodeKind::Hub => layers - 1,
					_ => rng.gen_range(0..layers),
				};
				spawn(kind, layer, layers, width, height, config, rng)
			})
			.collect();

		Self {
			nodes,
			width,
			height,
		}
	}

	#[cfg(test)]
	pub fn from_nodes(width: f64, height: f64, nodes: Vec<Node>) -> Self {
		Self {
			nodes,
			width: width.max(0.0),
			height: height.max(0.0),
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}

	pub fn distance(&self, a: usize, b: usize) -> f64 {
		let (na, nb) = (&self.nodes[a], &self.nodes[b]);
		(na.x - nb.x).hypot(na.y - nb.y)
	}

	pub fn step<R: Rng + ?Sized>(&mut self, pointer: Pointer, config: &FieldConfig, rng: &mut R) {
		let (width, height) = (self.width, self.height);
		for node in &mut self.nodes {
			step_node(node, pointer, config, width, height, rng);
		}
	}
}

fn spawn<R: Rng + ?Sized>(
	kind: NodeKind,
	layer: usize,
	layers: usize,
	width: f64,
	height: f64,
	config: &FieldConfig,
	rng: &mut R,
) -> Node {
	let scale = 0.55 + 0.45 * layer_depth(layer, layers);
	let (lo, hi) = kind.size_range();
	let speed = config.base_speed * scale;
	let (x, y) = (rng.gen_range(0.0..=width), rng.gen_range(0.0..=height));

	Node {
		x,
		y,
		vx: (rng.r#gen::<f64>() - 0.5) * speed,
		vy: (rng.r#gen::<f64>() - 0.5) * speed,
		home_x: x,
		home_y: y,
		size: rng.gen_range(lo..=hi) * scale,
		kind,
		layer,
		energy: 0.0,
		decay: config.energy_decay * kind.decay_factor(),
		phase: rng.gen_range(0.0..TAU),
		phase_speed: rng.gen_range(config.phase_speed.0..=config.phase_speed.1),
		scan_ring: 0.0,
	}
}

fn step_node<R: Rng + ?Sized>(
	node: &mut Node,
	pointer: Pointer,
	config: &FieldConfig,
	width: f64,
	height: f64,
	rng: &mut R,
) {
	node.phase = (node.phase + node.phase_speed).rem_euclid(TAU);
	node.energy = (node.energy - node.decay).max(0.0);

	let (dx, dy) = (pointer.x - node.x, pointer.y - node.y);
	let dist = dx.hypot(dy);

	if dist < config.repel_radius {
		let f = (config.repel_radius - dist) / config.repel_radius;
		// A pointer sitting exactly on the node has no direction; pick one.
		let (ux, uy) = if dist > 1e-9 {
			(-dx / dist, -dy / dist)
		} else {
			let angle = rng.gen_range(0.0..TAU);
			(angle.cos(), angle.sin())
		};
		node.x += ux * f * config.repel_push;
		node.y += uy * f * config.repel_push;
		node.energize(config.repel_boost);
	} else if dist < config.influence_radius {
		let f = (1.0 - dist / config.influence_radius) * config.attraction;
		node.vx += dx * f;
		node.vy += dy * f;
		node.energize(config.influence_boost);
	} else {
		node.vx += (rng.r#gen::<f64>() - 0.5) * config.jitter - node.vx * config.friction;
		node.vy += (rng.r#gen::<f64>() - 0.5) * config.jitter - node.vy * config.friction;
		node.vx += (node.phase + node.y * 0.01).sin() * config.drift;
		node.vy += (node.phase + node.x * 0.01).cos() * config.drift;
		node.vx += (node.home_x - node.x) * config.tether;
		node.vy += (node.home_y - node.y) * config.tether;
	}

	node.clamp_speed(config.max_speed);
	node.x += node.vx;
	node.y += node.vy;
	node.reflect(width, height, config.restitution);
	node.advance_scan(config.ring_increment, config.ring_cutoff_factor);
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	use super::*;

	fn rng() -> ChaCha8Rng {
		ChaCha8Rng::seed_from_u64(7)
	}

	fn lone(node: Node) -> NodeField {
		NodeField::from_nodes(800.0, 600.0, vec![node])
	}

	#[test]
	fn generate_respects_budget_and_kinds() {
		let config = FieldConfig::default();
		let field = NodeField::generate(800.0, 600.0, &config, &mut rng());
		assert_eq!(field.len(), 53);

		let hubs = field.nodes().iter().filter(|n| n.kind == NodeKind::Hub).count();
		let relays = field.nodes().iter().filter(|n| n.kind == NodeKind::Relay).count();
		assert_eq!(hubs, 6);
		assert_eq!(relays, 16);

		for n in field.nodes() {
			assert!((0.0..=800.0).contains(&n.x) && (0.0..=600.0).contains(&n.y));
			assert!(n.layer < config.layer_count);
			assert!(n.decay > 0.0);
			assert_eq!(n.energy, 0.0);
			assert_eq!(n.scan_ring, 0.0);
		}
	}

	#[test]
	fn zero_sized_surface_yields_empty_field() {
		let mut r = rng();
		let mut field = NodeField::generate(0.0, 0.0, &FieldConfig::default(), &mut r);
		assert!(field.is_empty());
		field.step(Pointer::at(0.0, 0.0), &FieldConfig::default(), &mut r);
	}

	#[test]
	fn nodes_stay_in_bounds_and_energy_stays_clamped() {
		let config = FieldConfig::default();
		let mut r = rng();
		let mut field = NodeField::generate(640.0, 480.0, &config, &mut r);

		for tick in 0..2000 {
			// Sweep the pointer across and beyond the surface.
			let t = tick as f64 * 0.01;
			let pointer = if tick % 500 < 400 {
				Pointer::at(320.0 + 400.0 * t.cos(), 240.0 + 300.0 * (1.3 * t).sin())
			} else {
				Pointer::OFF_SURFACE
			};
			field.step(pointer, &config, &mut r);

			for n in field.nodes() {
				assert!(n.x >= 0.0 && n.x <= 640.0, "x out of bounds: {}", n.x);
				assert!(n.y >= 0.0 && n.y <= 480.0, "y out of bounds: {}", n.y);
				assert!((0.0..=1.0).contains(&n.energy));
			}
		}
	}

	#[test]
	fn pointer_on_node_repels_and_energizes() {
		let config = FieldConfig::default();
		let mut node = Node::new(100.0, 100.0, NodeKind::Sensor, 2);
		node.energy = 0.3;
		let mut field = lone(node);

		field.step(Pointer::at(100.0, 100.0), &config, &mut rng());

		let n = &field.nodes()[0];
		assert!((n.x - 100.0).hypot(n.y - 100.0) > 1.0);
		assert!(n.energy > 0.3);
	}

	#[test]
	fn repel_pushes_directly_away_from_pointer() {
		let config = FieldConfig::default();
		let mut field = lone(Node::new(100.0, 100.0, NodeKind::Relay, 1));

		field.step(Pointer::at(130.0, 100.0), &config, &mut rng());

		let n = &field.nodes()[0];
		assert!(n.x < 100.0);
		assert!((n.y - 100.0).abs() < 1e-9);
	}

	#[test]
	fn influence_attracts_within_speed_limit() {
		let config = FieldConfig::default();
		let mut field = lone(Node::new(100.0, 100.0, NodeKind::Sensor, 2));
		let pointer = Pointer::at(250.0, 100.0);

		for _ in 0..50 {
			field.step(pointer, &config, &mut rng());
			let n = &field.nodes()[0];
			assert!(n.speed() <= config.max_speed + 1e-9);
		}
		assert!(field.nodes()[0].x > 100.0);
		assert!(field.nodes()[0].energy > 0.0);
	}

	#[test]
	fn idle_energy_decays_to_zero_and_stays() {
		let config = FieldConfig::default();
		let mut node = Node::new(400.0, 300.0, NodeKind::Sensor, 1);
		node.energy = 1.0;
		node.decay = 0.01;
		let mut field = lone(node);
		let mut r = rng();

		let mut previous = 1.0;
		for _ in 0..200 {
			field.step(Pointer::OFF_SURFACE, &config, &mut r);
			let e = field.nodes()[0].energy;
			assert!(e >= 0.0);
			assert!(e < previous || (e == 0.0 && previous == 0.0));
			previous = e;
		}
		assert_eq!(field.nodes()[0].energy, 0.0);

		field.step(Pointer::OFF_SURFACE, &config, &mut r);
		assert_eq!(field.nodes()[0].energy, 0.0);
	}

	#[test]
	fn idle_return_respects_speed_limit() {
		let config = FieldConfig::default();
		let mut field = NodeField::from_nodes(
			1600.0,
			1200.0,
			vec![Node::new(100.0, 600.0, NodeKind::Sensor, 2)],
		);
		let mut r = rng();

		// Drag the node far from its spawn point so the tether is fully loaded.
		for _ in 0..2000 {
			let n = &field.nodes()[0];
			if n.x >= 1450.0 {
				break;
			}
			let pointer = Pointer::at(n.x + 110.0, n.y);
			field.step(pointer, &config, &mut r);
		}
		assert!(field.nodes()[0].x >= 1450.0);

		for _ in 0..2000 {
			field.step(Pointer::OFF_SURFACE, &config, &mut r);
			let speed = field.nodes()[0].speed();
			assert!(speed <= config.max_speed + 1e-9, "idle speed {speed}");
		}
	}

	#[test]
	fn wall_bounce_inverts_velocity() {
		let config = FieldConfig::default();
		let mut node = Node::new(799.0, 300.0, NodeKind::Sensor, 2);
		node.vx = 5.0;
		let mut field = lone(node);

		field.step(Pointer::OFF_SURFACE, &config, &mut rng());

		let n = &field.nodes()[0];
		assert!(n.x <= 800.0);
		assert!(n.vx <= 0.0);
	}

	#[test]
	fn scan_ring_expands_then_resets() {
		let config = FieldConfig::default();
		let mut node = Node::new(400.0, 300.0, NodeKind::Hub, 2);
		node.trigger_scan(config.ring_start);
		let cutoff = node.size * config.ring_cutoff_factor;
		let mut field = lone(node);
		let mut r = rng();

		let mut previous = field.nodes()[0].scan_ring;
		let limit = (cutoff / config.ring_increment).ceil() as usize + 2;
		let mut reset_at = None;
		for tick in 0..limit {
			field.step(Pointer::OFF_SURFACE, &config, &mut r);
			let ring = field.nodes()[0].scan_ring;
			if ring == 0.0 {
				reset_at = Some(tick);
				break;
			}
			assert!(ring > previous);
			previous = ring;
		}
		assert!(reset_at.is_some());
	}

	#[test]
	fn trigger_scan_does_not_restart_an_expanding_ring() {
		let mut node = Node::new(0.0, 0.0, NodeKind::Hub, 0);
		node.trigger_scan(1.0);
		node.scan_ring = 12.0;
		node.trigger_scan(1.0);
		assert_eq!(node.scan_ring, 12.0);
	}
}
