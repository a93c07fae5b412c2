use leptos::prelude::*;
use neural_backdrop::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
