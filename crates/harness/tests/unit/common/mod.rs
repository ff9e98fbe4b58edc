
/// Error message rendering.
pub mod error;

/// Fixed-point quantization and Gray-code helpers.
pub mod fixed;
