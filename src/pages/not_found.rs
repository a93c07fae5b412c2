use leptos::prelude::*;

use crate::components::neural_background::{FieldConfig, NetworkConfig, NeuralBackground, NodeBudget};

// A sparse network, independent of the viewport size.
const STRAY_NODES: usize = 24;

/// 404 - Not Found
#[component]
pub fn NotFound() -> impl IntoView {
	let config = NetworkConfig {
		field: FieldConfig {
			budget: NodeBudget::Fixed(STRAY_NODES),
			hub_count: 2,
			..FieldConfig::default()
		},
		..NetworkConfig::default()
	};

	view! {
		<section class="not-found">
			<NeuralBackground config=config />
			<h1>"Page not found"</h1>
			<a href="/">"Back to the homepage"</a>
		</section>
	}
}
