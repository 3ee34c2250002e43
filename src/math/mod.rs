pub mod matrix;

pub use matrix::{Matrix, sample_standard_normal};
