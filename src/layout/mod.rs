//! Structural tree to geometry.
//!
//! Sizes are computed bottom-up and positions top-down. A conditional lays
//! its branches out at a throwaway origin first, so their real widths are
//! known, then moves them rigidly into place beside the diamond.

pub mod figure;
mod text;

use crate::config::LayoutConfig;
use crate::ir::{Conditional, Sequence, Statement};
use crate::text_metrics::TextMetrics;

pub use figure::{ConditionalFigure, Figure, Label, SequenceFigure, ShapeFigure, ShapeKind};

use text::{diamond_size, measure_label, padded_size, terminal_radius};

/// Builds the figure tree for a whole program with its top anchor at the
/// origin.
pub fn layout_program(
    program: &Sequence,
    metrics: &TextMetrics,
    config: &LayoutConfig,
) -> SequenceFigure {
    let figure = build_sequence(program, 0.0, 0.0, metrics, config);
    tracing::debug!(
        statements = program.statement_count(),
        width = figure.extent().0,
        height = figure.extent().1,
        "laid out program"
    );
    figure
}

/// Builds one statement with its top anchor at `(anchor_x, anchor_y)`.
pub fn build_figure(
    node: &Statement,
    anchor_x: f32,
    anchor_y: f32,
    metrics: &TextMetrics,
    config: &LayoutConfig,
) -> Figure {
    match node {
        Statement::Leaf { label } => {
            build_shape(label, ShapeKind::Box, anchor_x, anchor_y, metrics, config).into()
        }
        Statement::Terminal { label } => {
            let measured = measure_label(label, metrics);
            let kind = ShapeKind::Terminal {
                radius: terminal_radius(&measured, config),
            };
            padded_shape(measured, kind, anchor_x, anchor_y, config).into()
        }
        Statement::Input { label } => {
            let kind = ShapeKind::Input {
                slant: config.margin_x / 2.0,
            };
            build_shape(label, kind, anchor_x, anchor_y, metrics, config).into()
        }
        Statement::Conditional(cond) => {
            build_conditional(cond, anchor_x, anchor_y, metrics, config).into()
        }
    }
}

/// Stacks the items of `seq` downwards from `(anchor_x, anchor_y)`.
pub fn build_sequence(
    seq: &Sequence,
    anchor_x: f32,
    anchor_y: f32,
    metrics: &TextMetrics,
    config: &LayoutConfig,
) -> SequenceFigure {
    let mut children = Vec::with_capacity(seq.items.len());
    let mut cursor = anchor_y;
    for item in &seq.items {
        let child = build_figure(item, anchor_x, cursor, metrics, config);
        let (_, height) = child.extent();
        cursor += height + config.spacing;
        children.push(child);
    }
    SequenceFigure {
        x: anchor_x,
        y: anchor_y,
        spacing: config.spacing,
        children,
    }
}

pub fn build_conditional(
    cond: &Conditional,
    anchor_x: f32,
    anchor_y: f32,
    metrics: &TextMetrics,
    config: &LayoutConfig,
) -> ConditionalFigure {
    let measured = measure_label(&cond.label, metrics);
    let (diamond_width, diamond_height) = diamond_size(&measured);
    let diamond = ShapeFigure {
        kind: ShapeKind::Diamond,
        x: anchor_x,
        y: anchor_y,
        width: diamond_width,
        height: diamond_height,
        label: measured,
    };

    let mut left = build_sequence(&cond.on_true, 0.0, 0.0, metrics, config);
    let mut right = build_sequence(&cond.on_false, 0.0, 0.0, metrics, config);
    let (left_width, _) = left.extent();
    let (right_width, _) = right.extent();

    let (left_x, right_x) = branch_offsets(anchor_x, left_width, right_width, diamond_width, config);
    let branch_y = anchor_y + diamond_height + config.spacing;
    left.translate(left_x, branch_y);
    right.translate(right_x, branch_y);

    ConditionalFigure {
        diamond,
        left,
        right,
        spacing: config.spacing,
    }
}

/// Horizontal anchors of the two branches. A branch narrower than the
/// diamond is still pushed clear of the diamond's arm.
pub fn branch_offsets(
    anchor_x: f32,
    left_width: f32,
    right_width: f32,
    diamond_width: f32,
    config: &LayoutConfig,
) -> (f32, f32) {
    let left_x = anchor_x - left_width.max(diamond_width) / 2.0 - config.branch_gap;
    let right_x = anchor_x + right_width.max(diamond_width) / 2.0 + config.branch_gap;
    (left_x, right_x)
}

fn build_shape(
    label: &str,
    kind: ShapeKind,
    anchor_x: f32,
    anchor_y: f32,
    metrics: &TextMetrics,
    config: &LayoutConfig,
) -> ShapeFigure {
    padded_shape(measure_label(label, metrics), kind, anchor_x, anchor_y, config)
}

fn padded_shape(
    label: Label,
    kind: ShapeKind,
    anchor_x: f32,
    anchor_y: f32,
    config: &LayoutConfig,
) -> ShapeFigure {
    let (width, height) = padded_size(&label, config);
    ShapeFigure {
        kind,
        x: anchor_x,
        y: anchor_y,
        width,
        height,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> TextMetrics {
        TextMetrics::approximate(30.0, 30.0)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn program(items: Vec<Statement>) -> Sequence {
        Sequence::new(items)
    }

    #[test]
    fn two_leaves_stack_with_one_spacing_unit() {
        let config = LayoutConfig::default();
        let seq = build_sequence(
            &program(vec![Statement::leaf("A"), Statement::leaf("B")]),
            0.0,
            0.0,
            &metrics(),
            &config,
        );
        assert_eq!(seq.children.len(), 2);
        let a = &seq.children[0];
        let b = &seq.children[1];
        assert!(matches!(a, Figure::Shape(s) if s.kind == ShapeKind::Box));
        assert!(matches!(b, Figure::Shape(s) if s.kind == ShapeKind::Box));
        let (_, a_bottom) = a.bottom();
        let (_, b_top) = b.top_anchor();
        assert_eq!(b_top - a_bottom, config.spacing);
        assert_eq!(a.top_anchor(), (0.0, 0.0));
        assert_eq!(b.top_anchor().0, 0.0);
    }

    #[test]
    fn sequence_height_matches_sum_of_items() {
        let config = LayoutConfig::default();
        let seq = build_sequence(
            &program(vec![
                Statement::terminal("Begin"),
                Statement::input("n"),
                Statement::leaf("x = n * 2"),
                Statement::terminal("Stop"),
            ]),
            0.0,
            0.0,
            &metrics(),
            &config,
        );
        let heights: f32 = seq.children.iter().map(|c| c.extent().1).sum();
        assert!(approx(seq.extent().1, heights + 3.0 * config.spacing));
    }

    #[test]
    fn empty_sequence_builds_zero_size_placeholder() {
        let seq = build_sequence(&Sequence::empty(), 5.0, 9.0, &metrics(), &LayoutConfig::default());
        assert!(seq.is_empty());
        assert_eq!(seq.extent(), (0.0, 0.0));
        assert_eq!(seq.top_anchor(), (5.0, 9.0));
    }

    #[test]
    fn box_extent_is_label_plus_margins() {
        let config = LayoutConfig::default();
        let m = metrics();
        let figure = build_figure(&Statement::leaf("hello"), 0.0, 0.0, &m, &config);
        let (w, h) = figure.extent();
        assert!(approx(w, m.text_width("hello") + config.margin_x));
        assert_eq!(h, 30.0 + config.margin_y);
    }

    #[test]
    fn terminal_carries_corner_radius() {
        let config = LayoutConfig::default();
        let figure = build_figure(&Statement::terminal("Begin"), 0.0, 0.0, &metrics(), &config);
        let Figure::Shape(shape) = figure else {
            panic!("terminal should build a shape");
        };
        assert_eq!(shape.kind, ShapeKind::Terminal { radius: 30.0 });
    }

    #[test]
    fn conditional_branches_follow_offset_formula() {
        let config = LayoutConfig::default();
        let m = metrics();
        let cond = Conditional {
            label: "x > 0".to_string(),
            on_true: program(vec![Statement::leaf("a rather long statement here")]),
            on_false: program(vec![Statement::leaf("b")]),
        };
        let figure = build_conditional(&cond, 400.0, 50.0, &m, &config);
        let (diamond_width, diamond_height) = figure.diamond.extent();
        let (left_width, _) = figure.left.extent();
        let (right_width, _) = figure.right.extent();
        assert!(left_width > diamond_width);
        assert!(right_width < diamond_width);
        assert!(approx(
            figure.left.x,
            400.0 - left_width.max(diamond_width) / 2.0 - config.branch_gap
        ));
        assert!(approx(
            figure.right.x,
            400.0 + right_width.max(diamond_width) / 2.0 + config.branch_gap
        ));
        let branch_y = 50.0 + diamond_height + config.spacing;
        assert!(approx(figure.left.y, branch_y));
        assert!(approx(figure.right.y, branch_y));
        assert!(approx(figure.left.children[0].top_anchor().1, branch_y));
    }

    #[test]
    fn branch_offsets_hold_for_many_widths() {
        let config = LayoutConfig::default();
        for (lw, rw, dw) in [
            (10.0, 10.0, 90.0),
            (300.0, 20.0, 90.0),
            (20.0, 300.0, 180.0),
            (500.0, 400.0, 120.0),
        ] {
            let (left_x, right_x) = branch_offsets(0.0, lw, rw, dw, &config);
            assert_eq!(left_x, -(f32::max(lw, dw) / 2.0) - config.branch_gap);
            assert_eq!(right_x, f32::max(rw, dw) / 2.0 + config.branch_gap);
        }
    }

    #[test]
    fn conditional_with_empty_false_branch() {
        let config = LayoutConfig::default();
        let figure = build_figure(
            &Statement::conditional("X", program(vec![Statement::leaf("Y")]), Sequence::empty()),
            0.0,
            0.0,
            &metrics(),
            &config,
        );
        let Figure::Conditional(cond) = figure else {
            panic!("expected a conditional figure");
        };
        assert_eq!(cond.diamond.top_anchor(), (0.0, 0.0));
        assert_eq!(cond.left.children.len(), 1);
        assert!(cond.right.is_empty());
        assert_eq!(cond.right.extent(), (0.0, 0.0));
    }

    #[test]
    fn conditional_extent_spans_both_branches() {
        let config = LayoutConfig::default();
        let cond = Conditional {
            label: "c".to_string(),
            on_true: program(vec![Statement::leaf("left"), Statement::leaf("left again")]),
            on_false: program(vec![Statement::leaf("right")]),
        };
        let figure = build_conditional(&cond, 0.0, 0.0, &metrics(), &config);
        let (width, height) = figure.extent();
        let (lw, lh) = figure.left.extent();
        let (rw, rh) = figure.right.extent();
        let (_, dh) = figure.diamond.extent();
        assert!(approx(width, (figure.right.x - figure.left.x) + lw / 2.0 + rw / 2.0));
        assert!(approx(height, dh + config.spacing + lh.max(rh)));
    }

    #[test]
    fn layout_is_deterministic() {
        let config = LayoutConfig::default();
        let tree = program(vec![
            Statement::terminal("Begin"),
            Statement::conditional(
                "a",
                program(vec![Statement::conditional(
                    "b",
                    program(vec![Statement::leaf("c")]),
                    Sequence::empty(),
                )]),
                program(vec![Statement::input("d")]),
            ),
            Statement::terminal("Stop"),
        ]);
        let first = layout_program(&tree, &metrics(), &config);
        let second = layout_program(&tree, &metrics(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn translate_is_additive_and_preserves_extent() {
        let config = LayoutConfig::default();
        let tree = program(vec![
            Statement::leaf("a"),
            Statement::conditional(
                "b",
                program(vec![Statement::leaf("c")]),
                program(vec![Statement::leaf("d"), Statement::leaf("e")]),
            ),
        ]);
        let base = layout_program(&tree, &metrics(), &config);

        let mut twice = base.clone();
        twice.translate(10.0, 20.0);
        twice.translate(-4.0, 6.0);
        let mut once = base.clone();
        once.translate(6.0, 26.0);

        let base_shapes = Figure::Sequence(base.clone());
        let twice_shapes = Figure::Sequence(twice.clone());
        let once_shapes = Figure::Sequence(once.clone());
        let before = base_shapes.shapes();
        let after_twice = twice_shapes.shapes();
        let after_once = once_shapes.shapes();
        assert_eq!(before.len(), 5);
        for ((b, t), o) in before.iter().zip(&after_twice).zip(&after_once) {
            assert!(approx(t.x, b.x + 6.0) && approx(t.y, b.y + 26.0));
            assert!(approx(o.x, t.x) && approx(o.y, t.y));
            assert_eq!(t.extent(), b.extent());
        }
        assert_eq!(twice.extent(), base.extent());
    }

    #[test]
    fn nested_conditional_stays_inside_its_branch() {
        let config = LayoutConfig::default();
        let inner = Statement::conditional(
            "inner",
            program(vec![Statement::leaf("p")]),
            program(vec![Statement::leaf("q")]),
        );
        let outer = Conditional {
            label: "outer".to_string(),
            on_true: program(vec![inner]),
            on_false: Sequence::empty(),
        };
        let figure = build_conditional(&outer, 0.0, 0.0, &metrics(), &config);
        let Figure::Conditional(inner) = &figure.left.children[0] else {
            panic!("expected nested conditional");
        };
        assert_eq!(inner.diamond.x, figure.left.x);
        assert_eq!(inner.diamond.y, figure.left.y);
        let inner_branch_y = inner.diamond.y + inner.diamond.height + config.spacing;
        assert!(approx(inner.left.y, inner_branch_y));
        assert!(approx(inner.right.y, inner_branch_y));
        assert!(inner.left.x < inner.diamond.x && inner.right.x > inner.diamond.x);
    }
}
