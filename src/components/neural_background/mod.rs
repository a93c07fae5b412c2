mod component;
mod config;
mod error;
mod field;
mod graph;
mod lifecycle;
mod palette;
mod render;
mod simulation;
mod surface;
mod types;

pub use component::NeuralBackground;
pub use config::{FieldConfig, NetworkConfig, NodeBudget};
