//! Configuration types for the ZFL pipeline.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from an
//! external file, and every field falls back to its default when absent.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining parse and layout settings.
//! - [`LayoutConfig`] - Spacing constants used by the layered layout.
//!
//! # Example
//!
//! ```
//! # use zfl::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().rank_spacing(), 200.0);
//! assert_eq!(config.parse().file_name(), "<zfl>");
//! ```

use serde::Deserialize;

use zfl_parser::ParseConfig;

use crate::error::ZflError;

/// Top-level application configuration.
///
/// Groups [`ParseConfig`] and [`LayoutConfig`] into a single root.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Parse configuration section.
    #[serde(default)]
    parse: ParseConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    ///
    /// # Arguments
    ///
    /// * `parse` - Settings for the parse stage.
    /// * `layout` - Spacing constants for the layout stage.
    pub fn new(parse: ParseConfig, layout: LayoutConfig) -> Self {
        Self { parse, layout }
    }

    /// Returns the parse configuration.
    pub fn parse(&self) -> &ParseConfig {
        &self.parse
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Replaces the file name recorded in source refs.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.parse = self.parse.with_file_name(file_name);
        self
    }
}

/// Spacing constants for the layered layout.
///
/// All values are in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between the left edges of consecutive ranks.
    rank_spacing: f64,

    /// Vertical gap between nodes stacked in the same rank.
    node_spacing: f64,

    /// Padding around the members of a system group box.
    system_group_padding: f64,

    /// Offset of the first rank and first node from the canvas origin,
    /// also added once past the far edge of the drawing.
    canvas_padding: f64,
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ZflError::Config`] if any value is negative or not finite.
    pub fn new(
        rank_spacing: f64,
        node_spacing: f64,
        system_group_padding: f64,
        canvas_padding: f64,
    ) -> Result<Self, ZflError> {
        let config = Self {
            rank_spacing,
            node_spacing,
            system_group_padding,
            canvas_padding,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every spacing is a finite, non-negative number.
    ///
    /// Deserialized configurations are not validated automatically.
    pub fn validate(&self) -> Result<(), ZflError> {
        for (name, value) in [
            ("rank_spacing", self.rank_spacing),
            ("node_spacing", self.node_spacing),
            ("system_group_padding", self.system_group_padding),
            ("canvas_padding", self.canvas_padding),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ZflError::Config(format!(
                    "layout.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn rank_spacing(&self) -> f64 {
        self.rank_spacing
    }

    pub fn node_spacing(&self) -> f64 {
        self.node_spacing
    }

    pub fn system_group_padding(&self) -> f64 {
        self.system_group_padding
    }

    pub fn canvas_padding(&self) -> f64 {
        self.canvas_padding
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_spacing: 200.0,
            node_spacing: 80.0,
            system_group_padding: 40.0,
            canvas_padding: 20.0,
        }
    }
}
