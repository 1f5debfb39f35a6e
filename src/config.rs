use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry constants shared by the layout engine and the renderer drawing its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_gap: f32,
    pub row_gap: f32,
    pub loop_base_padding: f32,
    pub loop_depth_increment: f32,
    pub bypass_margin: f32,
    pub anchor_x: f32,
    /// Explicit primary root. Falls back to the first trigger, then the first root.
    pub root: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 260.0,
            node_height: 72.0,
            horizontal_gap: 40.0,
            row_gap: 60.0,
            loop_base_padding: 80.0,
            loop_depth_increment: 40.0,
            bypass_margin: 40.0,
            anchor_x: 0.0,
            root: None,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance between two consecutive rows.
    pub fn row_height(&self) -> f32 {
        self.node_height + self.row_gap
    }

    /// Horizontal gutter a loop reserves for its bypass line at the given nesting depth.
    pub fn loop_padding(&self, depth: usize) -> f32 {
        self.loop_base_padding + depth as f32 * self.loop_depth_increment
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
            ("horizontalGap", self.horizontal_gap),
            ("rowGap", self.row_gap),
            ("loopBasePadding", self.loop_base_padding),
            ("loopDepthIncrement", self.loop_depth_increment),
            ("bypassMargin", self.bypass_margin),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig { field, value });
            }
        }
        if !self.anchor_x.is_finite() {
            return Err(Error::InvalidConfig {
                field: "anchorX",
                value: self.anchor_x,
            });
        }
        Ok(())
    }

    /// Overlays a JSON5 object of camelCase overrides on this config.
    pub fn apply_json(&mut self, input: &str) -> Result<()> {
        let parsed: LayoutConfigFile = json5::from_str(input)?;
        parsed.apply(self);
        self.validate()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    horizontal_gap: Option<f32>,
    row_gap: Option<f32>,
    loop_base_padding: Option<f32>,
    loop_depth_increment: Option<f32>,
    bypass_margin: Option<f32>,
    anchor_x: Option<f32>,
    root: Option<String>,
}

impl LayoutConfigFile {
    fn apply(self, config: &mut LayoutConfig) {
        if let Some(v) = self.node_width {
            config.node_width = v;
        }
        if let Some(v) = self.node_height {
            config.node_height = v;
        }
        if let Some(v) = self.horizontal_gap {
            config.horizontal_gap = v;
        }
        if let Some(v) = self.row_gap {
            config.row_gap = v;
        }
        if let Some(v) = self.loop_base_padding {
            config.loop_base_padding = v;
        }
        if let Some(v) = self.loop_depth_increment {
            config.loop_depth_increment = v;
        }
        if let Some(v) = self.bypass_margin {
            config.bypass_margin = v;
        }
        if let Some(v) = self.anchor_x {
            config.anchor_x = v;
        }
        if let Some(v) = self.root {
            config.root = Some(v);
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let mut config = LayoutConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    config.apply_json(&contents)?;
    log::debug!("loaded layout config from {}", path.display());
    Ok(config)
}
