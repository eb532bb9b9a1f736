//! Rendering and connector walks over a finished figure tree.
//!
//! Both walks are stateless: they read positions computed by the layout
//! and emit primitives on a [`Surface`].

use crate::config::LayoutConfig;
use crate::layout::{ConditionalFigure, Figure, SequenceFigure, ShapeFigure, ShapeKind};
use crate::surface::{Surface, TextAnchor};

/// Filled arrowhead whose apex touches `(x, y)` from above.
pub fn arrowhead(surface: &mut dyn Surface, x: f32, y: f32, config: &LayoutConfig) {
    let half = config.arrow_width / 2.0;
    let base_y = y - config.arrow_height;
    surface.filled_triangle([(x - half, base_y), (x + half, base_y), (x, y)]);
}

/// Vertical middle of a branch label drawn beside a diamond vertex at `vertex_y`.
pub fn branch_label_y(vertex_y: f32, label_height: f32, config: &LayoutConfig) -> f32 {
    vertex_y - config.margin_y / 2.0 - label_height / 2.0
}

impl ShapeFigure {
    pub fn render(&self, surface: &mut dyn Surface) {
        let left = self.x - self.width / 2.0;
        let right = self.x + self.width / 2.0;
        let bottom = self.y + self.height;
        match self.kind {
            ShapeKind::Box => surface.rectangle(left, self.y, self.width, self.height),
            ShapeKind::Terminal { radius } => {
                surface.rounded_rectangle(left, self.y, self.width, self.height, radius)
            }
            ShapeKind::Input { slant } => surface.polygon(&[
                (left + slant, self.y),
                (right, self.y),
                (right - slant, bottom),
                (left, bottom),
            ]),
            ShapeKind::Diamond => surface.polygon(&[
                (self.x, self.y),
                self.right_vertex(),
                (self.x, bottom),
                self.left_vertex(),
            ]),
        }
        let (cx, cy) = self.center();
        surface.label(cx, cy, &self.label.text, TextAnchor::Middle);
    }

    pub fn connect_from(&self, x: f32, y: f32, surface: &mut dyn Surface, config: &LayoutConfig) {
        surface.polyline(&[self.bottom(), (x, y)]);
        arrowhead(surface, x, y, config);
    }
}

impl SequenceFigure {
    pub fn render(&self, surface: &mut dyn Surface) {
        for child in &self.children {
            child.render(surface);
        }
    }

    pub fn draw_connectors(&self, surface: &mut dyn Surface, config: &LayoutConfig) {
        for child in &self.children {
            child.draw_connectors(surface, config);
        }
        for pair in self.children.windows(2) {
            let (x, y) = pair[1].top_anchor();
            pair[0].connect_from(x, y, surface, config);
        }
    }

    pub fn connect_from(&self, x: f32, y: f32, surface: &mut dyn Surface, config: &LayoutConfig) {
        if let Some(last) = self.children.last() {
            last.connect_from(x, y, surface, config);
        }
    }

    /// Line leaving the bottom of this branch towards `(x, y)`. A trailing
    /// conditional merges its own branches on the way.
    fn exit_to(&self, x: f32, y: f32, surface: &mut dyn Surface) {
        match self.children.last() {
            Some(Figure::Conditional(cond)) => cond.merge_into(x, y, surface),
            _ => surface.polyline(&[self.bottom(), (x, y)]),
        }
    }
}

impl ConditionalFigure {
    pub fn render(&self, surface: &mut dyn Surface) {
        self.left.render(surface);
        self.right.render(surface);
        self.diamond.render(surface);
    }

    pub fn draw_connectors(&self, surface: &mut dyn Surface, config: &LayoutConfig) {
        let (left_vx, left_vy) = self.diamond.left_vertex();
        let (right_vx, right_vy) = self.diamond.right_vertex();
        let (left_x, left_y) = self.left.top_anchor();
        let (right_x, right_y) = self.right.top_anchor();

        surface.polyline(&[(left_vx, left_vy), (left_x, left_vy), (left_x, left_y)]);
        surface.polyline(&[(right_vx, right_vy), (right_x, right_vy), (right_x, right_y)]);

        // Surfaces place text by its vertical middle, so the branch label's
        // bottom edge sits margin_y / 2 above the vertex.
        let label_y = branch_label_y(left_vy, self.diamond.label.height, config);
        surface.label(
            left_vx - config.margin_x / 2.0,
            label_y,
            &config.true_label,
            TextAnchor::End,
        );
        surface.label(
            right_vx + config.margin_x / 2.0,
            label_y,
            &config.false_label,
            TextAnchor::Start,
        );

        if !self.left.is_empty() {
            arrowhead(surface, left_x, left_y, config);
        }
        if !self.right.is_empty() {
            arrowhead(surface, right_x, right_y, config);
        }

        self.left.draw_connectors(surface, config);
        self.right.draw_connectors(surface, config);
    }

    pub fn connect_from(&self, x: f32, y: f32, surface: &mut dyn Surface, config: &LayoutConfig) {
        self.merge_into(x, y, surface);
        arrowhead(surface, x, y, config);
    }

    /// Joins both branches halfway between the lower branch bottom and
    /// `y`, then runs a single line to `(x, y)`.
    pub fn merge_into(&self, x: f32, y: f32, surface: &mut dyn Surface) {
        let (left_x, left_bottom) = self.left.bottom();
        let (right_x, right_bottom) = self.right.bottom();
        let merge_y = (left_bottom.max(right_bottom) + y) / 2.0;

        self.left.exit_to(left_x, merge_y, surface);
        self.right.exit_to(right_x, merge_y, surface);
        surface.polyline(&[(left_x, merge_y), (right_x, merge_y)]);
        surface.polyline(&[(self.diamond.x, merge_y), (x, y)]);
    }
}

impl Figure {
    pub fn render(&self, surface: &mut dyn Surface) {
        match self {
            Figure::Shape(shape) => shape.render(surface),
            Figure::Sequence(seq) => seq.render(surface),
            Figure::Conditional(cond) => cond.render(surface),
        }
    }

    pub fn draw_connectors(&self, surface: &mut dyn Surface, config: &LayoutConfig) {
        match self {
            Figure::Shape(_) => {}
            Figure::Sequence(seq) => seq.draw_connectors(surface, config),
            Figure::Conditional(cond) => cond.draw_connectors(surface, config),
        }
    }

    /// Draws the edge entering `(x, y)` from this figure.
    pub fn connect_from(&self, x: f32, y: f32, surface: &mut dyn Surface, config: &LayoutConfig) {
        match self {
            Figure::Shape(shape) => shape.connect_from(x, y, surface, config),
            Figure::Sequence(seq) => seq.connect_from(x, y, surface, config),
            Figure::Conditional(cond) => cond.connect_from(x, y, surface, config),
        }
    }
}
