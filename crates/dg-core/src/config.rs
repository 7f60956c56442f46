//! Tunables shared by the layout stage and the CLI.
//!
//! Every field has a default so a partial TOML file (or none at all) still
//! yields a complete configuration.

use serde::{Deserialize, Serialize};

use crate::Enclosure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DiagramConfig {
    pub layout: LayoutSettings,
}

/// Geometry used to stack nodes in a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSettings {
    /// Horizontal center of the node column.
    pub origin_x: f32,
    /// Vertical center of the first node.
    pub origin_y: f32,
    /// Distance between the centers of consecutive nodes.
    pub row_spacing: f32,
    /// Space between the label and the node border on every side.
    pub padding: f32,
    /// Font size in pixels.
    pub font_size: f32,
    /// Average character width relative to the font size.
    pub avg_char_ratio: f32,
    pub min_node_width: f32,
    /// Horizontal skew applied to parallelogram nodes.
    pub parallelogram_slide: f32,
    /// Most recursive steps the longest-chain search may take before layout
    /// gives up on it and places nodes in walk order.
    pub chain_search_step_limit: usize,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            origin_x: 100.0,
            origin_y: 50.0,
            row_spacing: 100.0,
            padding: 20.0,
            font_size: 11.0,
            avg_char_ratio: 0.55,
            min_node_width: 40.0,
            parallelogram_slide: 15.0,
            chain_search_step_limit: 200_000,
        }
    }
}

impl LayoutSettings {
    /// Approximate rendered width of `text` on a single line.
    #[must_use]
    pub fn estimate_text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.font_size * self.avg_char_ratio
    }

    /// Box size `(width, height)` for a node label drawn with `enclosure`.
    #[must_use]
    pub fn node_size(&self, text: &str, enclosure: Enclosure) -> (f32, f32) {
        let label_width = self.estimate_text_width(text) + 2.0 * self.padding;
        let height = self.font_size + 2.0 * self.padding;
        let width = match enclosure {
            Enclosure::Rectangle | Enclosure::RoundedRectangle | Enclosure::Other => label_width,
            Enclosure::Parallelogram => label_width + self.parallelogram_slide.abs(),
        };
        (width.max(self.min_node_width), height)
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagramConfig, LayoutSettings};
    use crate::Enclosure;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: DiagramConfig = toml::from_str("").expect("empty config");
        assert_eq!(config, DiagramConfig::default());
    }

    #[test]
    fn partial_layout_section_keeps_other_defaults() {
        let config: DiagramConfig =
            toml::from_str("[layout]\nrow_spacing = 140.0\n").expect("partial config");
        assert_eq!(config.layout.row_spacing, 140.0);
        assert_eq!(config.layout.origin_y, LayoutSettings::default().origin_y);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = toml::from_str::<DiagramConfig>("[layout]\nrowspacing = 1.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn parallelogram_is_wider_than_rectangle() {
        let settings = LayoutSettings::default();
        let (rect, _) = settings.node_size("Hello", Enclosure::Rectangle);
        let (para, _) = settings.node_size("Hello", Enclosure::Parallelogram);
        assert!(para > rect);
    }

    #[test]
    fn node_size_respects_minimum_width() {
        let settings = LayoutSettings::default();
        let (width, height) = settings.node_size("", Enclosure::RoundedRectangle);
        assert_eq!(width, settings.min_node_width);
        assert!(height > 0.0);
    }
}
