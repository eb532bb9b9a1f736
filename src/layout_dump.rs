use crate::layout::{Figure, SequenceFigure, ShapeFigure, ShapeKind};
use crate::render::PlacedFigure;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub root: FigureDump,
}

#[derive(Debug, Serialize)]
pub struct FigureDump {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FigureDump>,
}

impl LayoutDump {
    pub fn from_placed(placed: &PlacedFigure) -> Self {
        Self {
            width: placed.width,
            height: placed.height,
            root: FigureDump::from_sequence(&placed.figure),
        }
    }
}

impl FigureDump {
    pub fn from_figure(figure: &Figure) -> Self {
        match figure {
            Figure::Shape(shape) => Self::from_shape(shape),
            Figure::Sequence(seq) => Self::from_sequence(seq),
            Figure::Conditional(cond) => {
                let (x, y) = cond.top_anchor();
                let (width, height) = cond.extent();
                FigureDump {
                    kind: figure.kind_name().to_string(),
                    x,
                    y,
                    width,
                    height,
                    label: Some(cond.diamond.label.text.clone()),
                    shape: None,
                    children: vec![
                        Self::from_shape(&cond.diamond),
                        Self::from_sequence(&cond.left),
                        Self::from_sequence(&cond.right),
                    ],
                }
            }
        }
    }

    fn from_shape(shape: &ShapeFigure) -> Self {
        FigureDump {
            kind: shape.kind.name().to_string(),
            x: shape.x,
            y: shape.y,
            width: shape.width,
            height: shape.height,
            label: Some(shape.label.text.clone()),
            shape: Some(shape.kind),
            children: Vec::new(),
        }
    }

    fn from_sequence(seq: &SequenceFigure) -> Self {
        let (width, height) = seq.extent();
        FigureDump {
            kind: "sequence".to_string(),
            x: seq.x,
            y: seq.y,
            width,
            height,
            label: None,
            shape: None,
            children: seq.children.iter().map(Self::from_figure).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, placed: &PlacedFigure) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_placed(placed);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse_program;
    use crate::render::place_program;
    use crate::text_metrics::TextMetrics;

    #[test]
    fn dump_mirrors_figure_tree() {
        let config = Config::default();
        let metrics = TextMetrics::approximate(30.0, 30.0);
        let program = parse_program("if x\n  y", &config.parser);
        let placed = place_program(&program, &metrics, &config);
        let dump = LayoutDump::from_placed(&placed);

        assert_eq!(dump.root.kind, "sequence");
        let kinds: Vec<_> = dump.root.children.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["terminal", "conditional", "terminal"]);

        let cond = &dump.root.children[1];
        assert_eq!(cond.label.as_deref(), Some("x"));
        assert_eq!(cond.children.len(), 3);
        assert_eq!(cond.children[0].kind, "diamond");
        assert_eq!(cond.children[1].children[0].label.as_deref(), Some("y"));
        assert!(cond.children[2].children.is_empty());
    }

    #[test]
    fn dump_serializes_shape_kind() {
        let config = Config::default();
        let metrics = TextMetrics::approximate(30.0, 30.0);
        let program = parse_program("input n", &config.parser);
        let placed = place_program(&program, &metrics, &config);
        let json = serde_json::to_value(LayoutDump::from_placed(&placed)).unwrap();
        let input = &json["root"]["children"][1];
        assert_eq!(input["kind"], "input");
        assert_eq!(input["shape"]["type"], "input");
        assert_eq!(input["shape"]["slant"], 15.0);
        assert!(json["root"]["children"][0]["shape"]["radius"].is_number());
    }
}
