//! The drawing contract the layout engine renders against.

use serde::Serialize;

pub type Point = (f32, f32);

/// Horizontal alignment of a label relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Stroke and fill primitives. Coordinates are canvas pixels with y
/// growing downwards.
pub trait Surface {
    fn polyline(&mut self, points: &[Point]);

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn rounded_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32);

    /// Closed outline through `points`.
    fn polygon(&mut self, points: &[Point]);

    fn filled_triangle(&mut self, points: [Point; 3]);

    /// A single line of text whose vertical middle sits at `y`.
    fn label(&mut self, x: f32, y: f32, text: &str, anchor: TextAnchor);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Polyline {
        points: Vec<Point>,
    },
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    RoundedRectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
    },
    Polygon {
        points: Vec<Point>,
    },
    FilledTriangle {
        points: [Point; 3],
    },
    Label {
        x: f32,
        y: f32,
        text: String,
        anchor: TextAnchor,
    },
}

/// Records every primitive in call order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn polylines(&self) -> impl Iterator<Item = &[Point]> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Polyline { points } => Some(points.as_slice()),
            _ => None,
        })
    }

    /// Apex of every arrowhead, i.e. the point each arrow enters.
    pub fn arrow_tips(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::FilledTriangle { points } => Some(points[2]),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DrawList {
    fn polyline(&mut self, points: &[Point]) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
        });
    }

    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::Rectangle {
            x,
            y,
            width,
            height,
        });
    }

    fn rounded_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        self.commands.push(DrawCommand::RoundedRectangle {
            x,
            y,
            width,
            height,
            radius,
        });
    }

    fn polygon(&mut self, points: &[Point]) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
        });
    }

    fn filled_triangle(&mut self, points: [Point; 3]) {
        self.commands.push(DrawCommand::FilledTriangle { points });
    }

    fn label(&mut self, x: f32, y: f32, text: &str, anchor: TextAnchor) {
        self.commands.push(DrawCommand::Label {
            x,
            y,
            text: text.to_string(),
            anchor,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_records_in_order() {
        let mut list = DrawList::new();
        list.rectangle(0.0, 0.0, 10.0, 5.0);
        list.polyline(&[(0.0, 0.0), (0.0, 10.0)]);
        list.label(5.0, 2.5, "hi", TextAnchor::Middle);
        list.filled_triangle([(-1.0, 8.0), (1.0, 8.0), (0.0, 10.0)]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.labels(), vec!["hi"]);
        assert_eq!(list.arrow_tips(), vec![(0.0, 10.0)]);
        assert_eq!(list.polylines().count(), 1);
    }

    #[test]
    fn draw_commands_serialize_with_op_tag() {
        let mut list = DrawList::new();
        list.label(1.0, 2.0, "x", TextAnchor::End);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["commands"][0]["op"], "label");
        assert_eq!(json["commands"][0]["anchor"], "end");
    }
}
