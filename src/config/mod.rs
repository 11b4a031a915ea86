//! Configuration management for the gesture pipeline
//!
//! Handles loading, parsing, validation and hot-reloading of YAML configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::controller::NavigationOptions;
use crate::error::ConfigError;
use crate::gesture::{PointerSwipeOptions, WheelSwipeOptions};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct GestureConfig {
    /// Width of the slide container in px
    #[serde(default = "default_container_width")]
    pub container_width: f64,
    /// Duration of the slide transition animation
    #[serde(default = "default_swipe_animation_duration")]
    pub swipe_animation_duration_ms: u64,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub carousel: CarouselConfig,
}

/// Lightbox controller switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ControllerSettings {
    /// Ignore horizontal pointer drags entirely
    #[serde(default)]
    pub disable_swipe_navigation: bool,
    /// Close the lightbox when the slide is pulled up
    #[serde(default)]
    pub close_on_pull_up: bool,
    /// Close the lightbox when the slide is pulled down
    #[serde(default)]
    pub close_on_pull_down: bool,
}

/// Carousel layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CarouselConfig {
    /// Stop at the first and last slide instead of wrapping around
    #[serde(default)]
    pub finite: bool,
    #[serde(default = "default_slides")]
    pub slides: usize,
    /// Slide shown first
    #[serde(default)]
    pub index: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            finite: false,
            slides: default_slides(),
            index: 0,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            swipe_animation_duration_ms: default_swipe_animation_duration(),
            controller: ControllerSettings::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

impl GestureConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: GestureConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.container_width.is_finite() || self.container_width <= 0.0 {
            return Err(ConfigError::InvalidContainerWidth(self.container_width));
        }
        if self.swipe_animation_duration_ms == 0 {
            return Err(ConfigError::InvalidAnimationDuration);
        }
        if self.carousel.slides == 0 {
            return Err(ConfigError::NoSlides);
        }
        if self.carousel.index >= self.carousel.slides {
            return Err(ConfigError::IndexOutOfRange {
                index: self.carousel.index,
                slides: self.carousel.slides,
            });
        }
        Ok(())
    }

    pub fn pointer_options(&self) -> PointerSwipeOptions {
        PointerSwipeOptions {
            disable_swipe_navigation: self.controller.disable_swipe_navigation,
            pull_up_enabled: self.controller.close_on_pull_up,
            pull_down_enabled: self.controller.close_on_pull_down,
            container_width: self.container_width,
            swipe_animation_duration_ms: self.swipe_animation_duration_ms,
        }
    }

    pub fn wheel_options(&self) -> WheelSwipeOptions {
        WheelSwipeOptions {
            container_width: self.container_width,
            swipe_animation_duration_ms: self.swipe_animation_duration_ms,
        }
    }

    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            finite: self.carousel.finite,
            slides: self.carousel.slides,
            start_index: self.carousel.index,
            swipe_animation_duration_ms: self.swipe_animation_duration_ms,
        }
    }

    /// JSON schema describing the configuration file
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(GestureConfig)
    }
}

// Default value functions
fn default_container_width() -> f64 { 1000.0 }
fn default_swipe_animation_duration() -> u64 { 500 }
fn default_slides() -> usize { 1 }
