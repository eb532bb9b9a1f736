use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub shape_fill: String,
    pub shape_stroke: String,
    pub line_color: String,
    pub arrow_color: String,
    pub branch_label_color: String,
    pub stroke_width: f32,
    pub background: String,
}

impl Theme {
    /// Black strokes on white, large type. Matches the look of hand-drawn
    /// textbook flowcharts.
    pub fn classic() -> Self {
        Self {
            font_family: "\"Go\", \"DejaVu Sans\", Arial, sans-serif".to_string(),
            font_size: 30.0,
            text_color: "#000000".to_string(),
            shape_fill: "none".to_string(),
            shape_stroke: "#000000".to_string(),
            line_color: "#000000".to_string(),
            arrow_color: "#000000".to_string(),
            branch_label_color: "#000000".to_string(),
            stroke_width: 1.0,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 26.0,
            text_color: "#1C2430".to_string(),
            shape_fill: "#F8FAFF".to_string(),
            shape_stroke: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            arrow_color: "#556480".to_string(),
            branch_label_color: "#556480".to_string(),
            stroke_width: 1.6,
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" | "base" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
