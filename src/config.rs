use crate::chart::ChartKind;
use crate::data::DisplayFlags;
use crate::layout::{H_SPACING, LayoutOptions, V_SPACING};
use crate::renderer::{ChartColors, RendererKind, RendererOptions};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub h_spacing: f32,
    pub v_spacing: f32,
    pub horizontal: bool,
    pub base_generation: i32,
    /// Measure text with the built-in width table instead of system fonts.
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            h_spacing: H_SPACING,
            v_spacing: V_SPACING,
            horizontal: false,
            base_generation: 0,
            fast_text_metrics: true,
        }
    }
}

impl LayoutConfig {
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            horizontal: self.horizontal,
            flip: false,
            base_generation: self.base_generation,
            h_spacing: self.h_spacing,
            v_spacing: self.v_spacing,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub renderer: RendererKind,
    pub colors: ChartColors,
    pub selected_language: Option<String>,
    pub display: DisplayFlags,
    /// Sort children and marriages by date before building the chart.
    pub normalize: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pixel density of PNG output.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub chart: ChartConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
            chart: ChartConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            colors: self.chart.colors,
            selected_language: self.chart.selected_language.clone(),
            theme: self.theme.clone(),
            fast_text_metrics: self.layout.fast_text_metrics,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    border_color: Option<String>,
    box_color: Option<String>,
    background: Option<String>,
    generation_colors: Option<Vec<String>>,
    male_color: Option<String>,
    female_color: Option<String>,
    ego_color: Option<String>,
    ethnicity_colors: Option<Vec<String>>,
    language_count_colors: Option<Vec<String>>,
    selected_language_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    h_spacing: Option<f32>,
    v_spacing: Option<f32>,
    horizontal: Option<bool>,
    base_generation: Option<i32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChartConfigFile {
    kind: Option<ChartKind>,
    renderer: Option<RendererKind>,
    colors: Option<ChartColors>,
    selected_language: Option<String>,
    hide_ids: Option<bool>,
    hide_sex: Option<bool>,
    hide_languages: Option<bool>,
    hide_ethnicity: Option<bool>,
    normalize: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    chart: Option<ChartConfigFile>,
    render: Option<RenderConfigFile>,
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str::<ConfigFile>(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str::<ConfigFile>(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err}; as JSON5: {json5_err}")
        }),
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed = parse_config_file(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => tracing::warn!(theme = other, "unknown theme, keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.border_color {
            config.theme.border_color = v;
        }
        if let Some(v) = vars.box_color {
            config.theme.box_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.generation_colors.filter(|colors| !colors.is_empty()) {
            config.theme.generation_colors = v;
        }
        if let Some(v) = vars.male_color {
            config.theme.male_color = v;
        }
        if let Some(v) = vars.female_color {
            config.theme.female_color = v;
        }
        if let Some(v) = vars.ego_color {
            config.theme.ego_color = v;
        }
        if let Some(v) = vars.ethnicity_colors.filter(|colors| !colors.is_empty()) {
            config.theme.ethnicity_colors = v;
        }
        if let Some(v) = vars.language_count_colors.filter(|colors| !colors.is_empty()) {
            config.theme.language_count_colors = v;
        }
        if let Some(v) = vars.selected_language_color {
            config.theme.selected_language_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.h_spacing {
            config.layout.h_spacing = v;
        }
        if let Some(v) = layout.v_spacing {
            config.layout.v_spacing = v;
        }
        if let Some(v) = layout.horizontal {
            config.layout.horizontal = v;
        }
        if let Some(v) = layout.base_generation {
            config.layout.base_generation = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    if let Some(chart) = parsed.chart {
        if let Some(v) = chart.kind {
            config.chart.kind = v;
        }
        if let Some(v) = chart.renderer {
            config.chart.renderer = v;
        }
        if let Some(v) = chart.colors {
            config.chart.colors = v;
        }
        if chart.selected_language.is_some() {
            config.chart.selected_language = chart.selected_language;
        }
        if let Some(v) = chart.hide_ids {
            config.chart.display.hide_ids = v;
        }
        if let Some(v) = chart.hide_sex {
            config.chart.display.hide_sex = v;
        }
        if let Some(v) = chart.hide_languages {
            config.chart.display.hide_languages = v;
        }
        if let Some(v) = chart.hide_ethnicity {
            config.chart.display.hide_ethnicity = v;
        }
        if let Some(v) = chart.normalize {
            config.chart.normalize = v;
        }
    }

    if let Some(v) = parsed.render.and_then(|render| render.scale) {
        config.render.scale = v;
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
