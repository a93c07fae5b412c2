use std::f64::consts::{PI, TAU};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::config::RenderConfig;
use super::field::Node;
use super::graph::Edge;
use super::palette::{Palette, Rgb};
use super::simulation::NetworkSimulation;
use super::types::{NodeKind, layer_depth};

const DASH: f64 = 4.0;
const GAP: f64 = 6.0;
const PULSE_TRAIL: usize = 5;
const TRAIL_SPACING: f64 = 0.035;

pub fn render(sim: &NetworkSimulation, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (sim.width(), sim.height());
	if w <= 0.0 || h <= 0.0 {
		return;
	}
	let config = &sim.config().render;

	draw_background(ctx, config, w, h);
	draw_ambient_glows(ctx, config, w, h, sim.time());
	if let Some(spacing) = config.grid_spacing {
		draw_grid(ctx, &config.palette, w, h, spacing);
	}

	let layers = sim.config().field.layer_count.max(1);
	for layer in 0..layers {
		draw_edges(sim, ctx, layer, layers);
		draw_nodes(sim, ctx, layer, layers);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if config.vignette {
		draw_vignette(ctx, &config.palette, w, h);
	}
}

fn draw_background(ctx: &CanvasRenderingContext2d, config: &RenderConfig, w: f64, h: f64) {
	let base = config.palette.background;
	ctx.set_fill_style_str(&base.rgba(config.trail_alpha.clamp(0.05, 1.0)));
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_ambient_glows(ctx: &CanvasRenderingContext2d, config: &RenderConfig, w: f64, h: f64, time: f64) {
	let radius = w.max(h) * 0.45;
	for i in 0..config.glow_count {
		let (x, y) = glow_center(i, time, w, h);
		let color = if i % 2 == 0 {
			config.palette.cool_bright
		} else {
			config.palette.hot
		};
		let Ok(gradient) = ctx.create_radial_gradient(x, y, 0.0, x, y, radius) else {
			continue;
		};
		let _ = gradient.add_color_stop(0.0, &color.rgba(0.07));
		let _ = gradient.add_color_stop(1.0, &color.rgba(0.0));
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill_rect(0.0, 0.0, w, h);
	}
}

fn draw_grid(ctx: &CanvasRenderingContext2d, palette: &Palette, w: f64, h: f64, spacing: f64) {
	if spacing < 4.0 {
		return;
	}
	ctx.set_stroke_style_str(&palette.cool.rgba(0.035));
	ctx.set_line_width(1.0);
	ctx.begin_path();
	let mut x = 0.5;
	while x < w {
		ctx.move_to(x, 0.0);
		ctx.line_to(x, h);
		x += spacing;
	}
	let mut y = 0.5;
	while y < h {
		ctx.move_to(0.0, y);
		ctx.line_to(w, y);
		y += spacing;
	}
	ctx.stroke();
}

fn draw_edges(sim: &NetworkSimulation, ctx: &CanvasRenderingContext2d, layer: usize, layers: usize) {
	let config = &sim.config().render;
	let palette = &config.palette;
	let nodes = sim.field().nodes();
	let depth = layer_depth(layer, layers);
	let layer_fade = layer_alpha(depth);
	let dashed = js_sys::Array::of2(&JsValue::from_f64(DASH), &JsValue::from_f64(GAP));
	let solid = js_sys::Array::new();

	for edge in sim.graph().edges() {
		if edge.layer != layer || !edge.active {
			continue;
		}
		let (a, b) = (&nodes[edge.a], &nodes[edge.b]);
		let energy = (a.energy + b.energy) / 2.0;
		let alpha = (edge.strength * 0.45 + energy * 0.5).min(0.9) * layer_fade;
		if alpha < 0.01 && !edge.has_pulse() {
			continue;
		}

		ctx.set_stroke_style_str(&palette.tone(energy).rgba(alpha));
		ctx.set_line_width((0.6 + energy * 1.2) * (0.6 + 0.4 * depth));
		if config.dashed_edges && energy > 0.2 {
			let _ = ctx.set_line_dash(&dashed);
			ctx.set_line_dash_offset(-edge.dash_offset);
		} else {
			let _ = ctx.set_line_dash(&solid);
		}
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();

		if edge.has_pulse() {
			draw_pulse(ctx, edge, nodes, palette, layer_fade);
		}
	}
	let _ = ctx.set_line_dash(&solid);
}

fn draw_pulse(
	ctx: &CanvasRenderingContext2d,
	edge: &Edge,
	nodes: &[Node],
	palette: &Palette,
	layer_fade: f64,
) {
	let (from, to) = (&nodes[edge.pulse_from], &nodes[edge.pulse_target()]);
	for (t, fade) in pulse_trail(edge.pulse) {
		let (x, y) = (from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
		ctx.set_fill_style_str(&palette.hot_bright.rgba(fade * 0.9 * layer_fade));
		ctx.begin_path();
		let _ = ctx.arc(x, y, 1.0 + 1.6 * fade, 0.0, TAU);
		ctx.fill();
	}

	let t = edge.pulse.clamp(0.0, 1.0);
	let (x, y) = (from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
	ctx.set_fill_style_str(&Rgb::WHITE.rgba(0.95 * layer_fade));
	ctx.begin_path();
	let _ = ctx.arc(x, y, 1.2, 0.0, TAU);
	ctx.fill();
}

fn draw_nodes(sim: &NetworkSimulation, ctx: &CanvasRenderingContext2d, layer: usize, layers: usize) {
	let config = &sim.config().render;
	let palette = &config.palette;
	let ring_cutoff = sim.config().field.ring_cutoff_factor;
	let layer_fade = layer_alpha(layer_depth(layer, layers));

	for node in sim.field().nodes().iter().filter(|n| n.layer == layer) {
		let (x, y, energy) = (node.x, node.y, node.energy);
		let r = node.size * (1.0 + node.phase.sin() * 0.2 * (0.25 + energy));

		if energy > 0.05 {
			let halo = r * (4.0 + energy * 6.0);
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, r * 0.4, x, y, halo) {
				let tone = palette.bright_tone(energy);
				let _ = gradient.add_color_stop(0.0, &tone.rgba(energy * 0.5 * layer_fade));
				let _ = gradient.add_color_stop(1.0, &tone.rgba(0.0));
				ctx.begin_path();
				let _ = ctx.arc(x, y, halo, 0.0, TAU);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		if node.scan_ring > 0.0 {
			let fade = 1.0 - node.scan_ring / (node.size * ring_cutoff).max(f64::EPSILON);
			ctx.set_stroke_style_str(&palette.bright_tone(energy).rgba(fade * 0.7 * layer_fade));
			ctx.set_line_width(1.2);
			ctx.begin_path();
			let _ = ctx.arc(x, y, r + node.scan_ring, 0.0, TAU);
			ctx.stroke();
		}

		ctx.begin_path();
		if config.hexagon_hubs && node.kind == NodeKind::Hub {
			let [first, rest @ ..] = hexagon(x, y, r * 1.25);
			ctx.move_to(first.0, first.1);
			for (vx, vy) in rest {
				ctx.line_to(vx, vy);
			}
			ctx.close_path();
		} else {
			let _ = ctx.arc(x, y, r, 0.0, TAU);
		}
		ctx.set_fill_style_str(&palette.blend(energy).rgba((0.55 + 0.4 * energy) * layer_fade));
		ctx.fill();
		ctx.set_stroke_style_str(&palette.bright_tone(energy).rgba((0.5 + 0.5 * energy) * layer_fade));
		ctx.set_line_width(1.0);
		ctx.stroke();

		ctx.set_fill_style_str(&Rgb::WHITE.rgba((0.4 + 0.6 * energy) * layer_fade));
		ctx.begin_path();
		let _ = ctx.arc(x, y, r * 0.35, 0.0, TAU);
		ctx.fill();
	}
}

fn draw_vignette(ctx: &CanvasRenderingContext2d, palette: &Palette, w: f64, h: f64) {
	let (cx, cy) = (w / 2.0, h / 2.0);
	let Ok(gradient) =
		ctx.create_radial_gradient(cx, cy, w.min(h) * 0.35, cx, cy, w.hypot(h) / 2.0)
	else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &palette.background.rgba(0.0));
	let _ = gradient.add_color_stop(1.0, &palette.background.rgba(0.75));
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn layer_alpha(depth: f64) -> f64 {
	0.35 + 0.65 * depth
}

/// Centre of the `index`th ambient glow; a slow function of time only.
fn glow_center(index: usize, time: f64, w: f64, h: f64) -> (f64, f64) {
	let offset = index as f64;
	(
		w * (0.5 + 0.35 * (time * 0.07 + offset * 2.1).sin()),
		h * (0.5 + 0.3 * (time * 0.05 + offset * 1.3).cos()),
	)
}

fn hexagon(x: f64, y: f64, r: f64) -> [(f64, f64); 6] {
	std::array::from_fn(|i| {
		let angle = PI / 6.0 + i as f64 * PI / 3.0;
		(x + r * angle.cos(), y + r * angle.sin())
	})
}

/// Trail samples behind a pulse head as `(progress, fade)`, oldest first.
fn pulse_trail(progress: f64) -> impl Iterator<Item = (f64, f64)> {
	(1..=PULSE_TRAIL).rev().filter_map(move |i| {
		let t = progress - i as f64 * TRAIL_SPACING;
		(t >= 0.0).then(|| (t, 1.0 - i as f64 / (PULSE_TRAIL + 1) as f64))
	})
}
