use std::time::Duration;

use serde::Deserialize;

use crate::layout::LayoutConfig;
use crate::media::BuildOptions;
use crate::view::{CullBudget, InteractionConfig};

/// Camera, label and pointer settings of the view.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f32,
    pub height: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale applied by `reset_view`.
    pub initial_scale: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    /// Scale used when centring on a single search hit.
    pub focus_scale: f32,
    /// Non-emphasized labels are only drawn at or above this zoom.
    pub label_min_zoom: f32,
    pub label_max_chars: usize,
    pub hit_radius: f32,
    pub unpin_grace_ms: u64,
    /// Extra screen pixels around the viewport kept by the culler.
    pub viewport_margin: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            min_scale: 0.1,
            max_scale: 8.0,
            initial_scale: 0.8,
            zoom_in_factor: 1.5,
            zoom_out_factor: 0.67,
            focus_scale: 1.5,
            label_min_zoom: 1.2,
            label_max_chars: 20,
            hit_radius: 12.0,
            unpin_grace_ms: 1500,
            viewport_margin: 80.0,
        }
    }
}

impl ViewConfig {
    pub fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            hit_radius: self.hit_radius,
            unpin_grace: Duration::from_millis(self.unpin_grace_ms),
            ..InteractionConfig::default()
        }
    }
}

/// Settings for one visualization session, loadable from JSON. Every
/// field is optional in the file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub build: BuildOptions,
    pub layout: LayoutConfig,
    pub cull: CullBudget,
    pub view: ViewConfig,
}

impl VisualizationConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
