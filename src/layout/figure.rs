//! Positioned, sized shapes.
//!
//! Every figure is anchored at its top-center point. Containers own their
//! children outright, so moving a container moves everything inside it.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
    Terminal { radius: f32 },
    Input { slant: f32 },
    Diamond,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFigure {
    pub kind: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceFigure {
    pub x: f32,
    pub y: f32,
    pub spacing: f32,
    pub children: Vec<Figure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFigure {
    pub diamond: ShapeFigure,
    pub left: SequenceFigure,
    pub right: SequenceFigure,
    pub spacing: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Shape(ShapeFigure),
    Sequence(SequenceFigure),
    Conditional(ConditionalFigure),
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Terminal { .. } => "terminal",
            ShapeKind::Input { .. } => "input",
            ShapeKind::Diamond => "diamond",
        }
    }
}

impl ShapeFigure {
    pub fn top_anchor(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn extent(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn bottom(&self) -> (f32, f32) {
        (self.x, self.y + self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x, self.y + self.height / 2.0)
    }

    /// Left vertex of a diamond (left edge midpoint for other shapes).
    pub fn left_vertex(&self) -> (f32, f32) {
        (self.x - self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right_vertex(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn horizontal_bounds(&self) -> (f32, f32) {
        (self.x - self.width / 2.0, self.x + self.width / 2.0)
    }
}

impl SequenceFigure {
    pub fn empty(x: f32, y: f32, spacing: f32) -> Self {
        Self {
            x,
            y,
            spacing,
            children: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn top_anchor(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn extent(&self) -> (f32, f32) {
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for child in &self.children {
            let (w, h) = child.extent();
            width = width.max(w);
            height += h;
        }
        if !self.children.is_empty() {
            height += (self.children.len() - 1) as f32 * self.spacing;
        }
        (width, height)
    }

    pub fn bottom(&self) -> (f32, f32) {
        let (_, height) = self.extent();
        (self.x, self.y + height)
    }

    /// Leftmost and rightmost x reached by anything inside, including the
    /// anchor an empty branch's elbow runs to.
    pub fn horizontal_bounds(&self) -> (f32, f32) {
        self.children
            .iter()
            .map(Figure::horizontal_bounds)
            .fold((self.x, self.x), |(min, max), (lo, hi)| (min.min(lo), max.max(hi)))
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for child in &mut self.children {
            child.translate(dx, dy);
        }
        self.x += dx;
        self.y += dy;
    }
}

impl ConditionalFigure {
    pub fn top_anchor(&self) -> (f32, f32) {
        self.diamond.top_anchor()
    }

    pub fn extent(&self) -> (f32, f32) {
        let (_, diamond_height) = self.diamond.extent();
        let (left_width, left_height) = self.left.extent();
        let (right_width, right_height) = self.right.extent();
        let height = diamond_height + self.spacing + left_height.max(right_height);
        let span = (self.left.x - self.right.x).abs();
        let width = span + left_width / 2.0 + right_width / 2.0;
        (width, height)
    }

    pub fn bottom(&self) -> (f32, f32) {
        let (_, height) = self.extent();
        (self.diamond.x, self.diamond.y + height)
    }

    /// Unlike `extent`, this follows branches that lean past their anchor.
    pub fn horizontal_bounds(&self) -> (f32, f32) {
        let (diamond_min, diamond_max) = self.diamond.horizontal_bounds();
        let (left_min, left_max) = self.left.horizontal_bounds();
        let (right_min, right_max) = self.right.horizontal_bounds();
        (
            diamond_min.min(left_min).min(right_min),
            diamond_max.max(left_max).max(right_max),
        )
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.diamond.translate(dx, dy);
        self.left.translate(dx, dy);
        self.right.translate(dx, dy);
    }
}

impl Figure {
    /// The point other figures connect into.
    pub fn top_anchor(&self) -> (f32, f32) {
        match self {
            Figure::Shape(shape) => shape.top_anchor(),
            Figure::Sequence(seq) => seq.top_anchor(),
            Figure::Conditional(cond) => cond.top_anchor(),
        }
    }

    pub fn extent(&self) -> (f32, f32) {
        match self {
            Figure::Shape(shape) => shape.extent(),
            Figure::Sequence(seq) => seq.extent(),
            Figure::Conditional(cond) => cond.extent(),
        }
    }

    pub fn bottom(&self) -> (f32, f32) {
        match self {
            Figure::Shape(shape) => shape.bottom(),
            Figure::Sequence(seq) => seq.bottom(),
            Figure::Conditional(cond) => cond.bottom(),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Figure::Shape(shape) => shape.translate(dx, dy),
            Figure::Sequence(seq) => seq.translate(dx, dy),
            Figure::Conditional(cond) => cond.translate(dx, dy),
        }
    }

    pub fn horizontal_bounds(&self) -> (f32, f32) {
        match self {
            Figure::Shape(shape) => shape.horizontal_bounds(),
            Figure::Sequence(seq) => seq.horizontal_bounds(),
            Figure::Conditional(cond) => cond.horizontal_bounds(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Figure::Shape(shape) => shape.kind.name(),
            Figure::Sequence(_) => "sequence",
            Figure::Conditional(_) => "conditional",
        }
    }

    /// Visits every shape (boxes, terminals, inputs, diamonds) depth-first.
    pub fn for_each_shape<'a>(&'a self, visit: &mut dyn FnMut(&'a ShapeFigure)) {
        match self {
            Figure::Shape(shape) => visit(shape),
            Figure::Sequence(seq) => {
                for child in &seq.children {
                    child.for_each_shape(visit);
                }
            }
            Figure::Conditional(cond) => {
                visit(&cond.diamond);
                for child in cond.left.children.iter().chain(&cond.right.children) {
                    child.for_each_shape(visit);
                }
            }
        }
    }

    pub fn shapes(&self) -> Vec<&ShapeFigure> {
        let mut shapes = Vec::new();
        self.for_each_shape(&mut |shape| shapes.push(shape));
        shapes
    }
}

impl From<ShapeFigure> for Figure {
    fn from(shape: ShapeFigure) -> Self {
        Figure::Shape(shape)
    }
}

impl From<SequenceFigure> for Figure {
    fn from(seq: SequenceFigure) -> Self {
        Figure::Sequence(seq)
    }
}

impl From<ConditionalFigure> for Figure {
    fn from(cond: ConditionalFigure) -> Self {
        Figure::Conditional(cond)
    }
}
