use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical gap between consecutive statements, and between a diamond
    /// and its branches.
    pub spacing: f32,
    /// Horizontal gap between a diamond's arm and the branch beside it.
    pub branch_gap: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Fixed height reported for every label.
    pub line_height: f32,
    pub arrow_width: f32,
    pub arrow_height: f32,
    pub true_label: String,
    pub false_label: String,
    pub fast_text_metrics: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 100.0,
            branch_gap: 100.0,
            margin_x: 30.0,
            margin_y: 30.0,
            line_height: 30.0,
            arrow_width: 15.0,
            arrow_height: 10.0,
            true_label: "1".to_string(),
            false_label: "0".to_string(),
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    pub start_label: String,
    pub stop_label: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            start_label: "Begin".to_string(),
            stop_label: "Stop".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub padding: f32,
    /// Raster scale factor for PNG output.
    pub scale: f32,
    pub font_file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            scale: 1.0,
            font_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub parser: ParserConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    text_color: Option<String>,
    shape_fill: Option<String>,
    shape_stroke: Option<String>,
    line_color: Option<String>,
    arrow_color: Option<String>,
    branch_label_color: Option<String>,
    stroke_width: Option<NumberOrString>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    spacing: Option<f32>,
    branch_gap: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
    line_height: Option<f32>,
    arrow_width: Option<f32>,
    arrow_height: Option<f32>,
    true_label: Option<String>,
    false_label: Option<String>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ParserConfigFile {
    start_label: Option<String>,
    stop_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    padding: Option<f32>,
    scale: Option<f32>,
    font_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    parser: Option<ParserConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config = parse_config(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;

    // Relative font paths are resolved against the config file's directory.
    if let Some(font) = config.render.font_file.as_mut() {
        if font.is_relative() {
            if let Some(dir) = path.parent() {
                *font = dir.join(&*font);
            }
        }
    }
    Ok(config)
}

/// Parses JSON5 configuration text on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}'"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f32()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.shape_fill {
            config.theme.shape_fill = v;
        }
        if let Some(v) = vars.shape_stroke {
            config.theme.shape_stroke = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.arrow_color {
            config.theme.arrow_color = v;
        }
        if let Some(v) = vars.branch_label_color {
            config.theme.branch_label_color = v;
        }
        if let Some(v) = vars.stroke_width.and_then(|v| v.as_f32()) {
            config.theme.stroke_width = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.spacing {
            config.layout.spacing = v;
        }
        if let Some(v) = layout.branch_gap {
            config.layout.branch_gap = v;
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v;
        }
        if let Some(v) = layout.line_height {
            config.layout.line_height = v;
        }
        if let Some(v) = layout.arrow_width {
            config.layout.arrow_width = v;
        }
        if let Some(v) = layout.arrow_height {
            config.layout.arrow_height = v;
        }
        if let Some(v) = layout.true_label {
            config.layout.true_label = v;
        }
        if let Some(v) = layout.false_label {
            config.layout.false_label = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
    }

    if let Some(parser) = parsed.parser {
        if let Some(v) = parser.start_label {
            config.parser.start_label = v;
        }
        if let Some(v) = parser.stop_label {
            config.parser.stop_label = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
        if let Some(v) = render.scale {
            config.render.scale = v;
        }
        if render.font_file.is_some() {
            config.render.font_file = render.font_file;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout.spacing, 100.0);
        assert_eq!(config.parser.start_label, "Begin");
    }

    #[test]
    fn parse_config_overrides_selected_fields() {
        let config = parse_config(
            r##"{
                // comments are allowed
                theme: "modern",
                themeVariables: { fontSize: "18px", lineColor: "#ff0000" },
                layout: { spacing: 40, trueLabel: "yes", falseLabel: "no" },
                parser: { startLabel: "Start" },
                render: { scale: 2 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.line_color, "#ff0000");
        assert_eq!(config.theme.shape_fill, Theme::modern().shape_fill);
        assert_eq!(config.layout.spacing, 40.0);
        assert_eq!(config.layout.branch_gap, 100.0);
        assert_eq!(config.layout.true_label, "yes");
        assert_eq!(config.layout.false_label, "no");
        assert_eq!(config.parser.start_label, "Start");
        assert_eq!(config.parser.stop_label, "Stop");
        assert_eq!(config.render.scale, 2.0);
    }

    #[test]
    fn parse_config_rejects_unknown_theme() {
        let err = parse_config(r#"{ theme: "neon" }"#).unwrap_err();
        assert!(err.to_string().contains("neon"));
    }

    #[test]
    fn relative_font_file_resolves_against_config_dir() {
        let dir = std::env::temp_dir().join(format!("pseudoflow-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json5");
        std::fs::write(&path, r#"{ render: { fontFile: "fonts/Go.ttf" } }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.render.font_file, Some(dir.join("fonts/Go.ttf")));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
