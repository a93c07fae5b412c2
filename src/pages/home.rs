use leptos::prelude::*;

use crate::components::neural_background::NeuralBackground;

/// Landing page: the hero section hosts the particle network behind its copy.
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<main class="landing">
			<section id="hero" class="hero">
				<NeuralBackground />
				<div class="hero-overlay">
					<h1>"Connected security for public institutions"</h1>
					<p class="subtitle">
						"Sensors, relays and command hubs working as one network."
					</p>
					<a class="cta" href="#contact">"Talk to us"</a>
				</div>
			</section>
		</main>
	}
}
