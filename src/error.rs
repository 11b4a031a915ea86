//! Typed errors for configuration and trace input

use thiserror::Error;

/// A configuration that parses but cannot drive the recognizers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("container_width must be a positive number of pixels, got {0}")]
    InvalidContainerWidth(f64),

    #[error("swipe_animation_duration_ms must be greater than zero")]
    InvalidAnimationDuration,

    #[error("carousel must contain at least one slide")]
    NoSlides,

    #[error("carousel.index {index} is out of range for {slides} slide(s)")]
    IndexOutOfRange { index: usize, slides: usize },
}

/// A trace that cannot be replayed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("step {step} at {at_ms}ms comes before the previous step at {previous_ms}ms")]
    OutOfOrder {
        step: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
