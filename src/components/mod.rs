pub mod neural_background;
