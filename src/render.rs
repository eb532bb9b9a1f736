use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::error::RenderError;
use crate::ir::Sequence;
use crate::layout::{SequenceFigure, layout_program};
use crate::parser::parse_program;
use crate::surface::{Point, Surface, TextAnchor};
use crate::text_metrics::{FontSettings, MetricsError, TextMetrics};
use crate::theme::Theme;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

/// A figure tree moved onto its canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFigure {
    pub figure: SequenceFigure,
    pub width: f32,
    pub height: f32,
}

/// Lays `program` out with its spine on the canvas's vertical center line.
/// Each half of the canvas is at least the figure's width, and wider when
/// nested branches lean further than that to one side.
pub fn place_program(program: &Sequence, metrics: &TextMetrics, config: &Config) -> PlacedFigure {
    let mut figure = layout_program(program, metrics, &config.layout);
    let (width, height) = figure.extent();
    let (min_x, max_x) = figure.horizontal_bounds();
    let half_width = width.max(figure.x - min_x).max(max_x - figure.x);
    let padding = config.render.padding.max(0.0);
    let canvas_width = (2.0 * half_width + 2.0 * padding).ceil();
    let canvas_height = (height + 2.0 * padding).ceil();
    figure.translate(canvas_width / 2.0, padding);
    tracing::debug!(canvas_width, canvas_height, "placed figure on canvas");
    PlacedFigure {
        figure,
        width: canvas_width,
        height: canvas_height,
    }
}

/// Shapes first, then every connector.
pub fn draw_figure(figure: &SequenceFigure, surface: &mut dyn Surface, config: &LayoutConfig) {
    figure.render(surface);
    figure.draw_connectors(surface, config);
}

pub fn render_svg(program: &Sequence, metrics: &TextMetrics, config: &Config) -> String {
    let placed = place_program(program, metrics, config);
    let mut surface = SvgSurface::new(placed.width, placed.height, &config.theme);
    draw_figure(&placed.figure, &mut surface, &config.layout);
    surface.finish()
}

/// Renders a structural tree to encoded image bytes.
pub fn render_to_image(
    program: &Sequence,
    metrics: &TextMetrics,
    config: &Config,
    format: ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let svg = render_svg(program, metrics, config);
    match format {
        ImageFormat::Svg => Ok(svg.into_bytes()),
        ImageFormat::Png => render_png(&svg, &config.render),
    }
}

/// Parses `source` with the configured terminals, then renders it.
pub fn render_source(
    source: &str,
    metrics: &TextMetrics,
    config: &Config,
    format: ImageFormat,
) -> Result<Vec<u8>, RenderError> {
    let program = parse_program(source, &config.parser);
    render_to_image(&program, metrics, config, format)
}

/// Builds the measurement context described by `config`.
pub fn load_metrics(config: &Config) -> Result<TextMetrics, MetricsError> {
    if config.layout.fast_text_metrics {
        return Ok(TextMetrics::approximate(
            config.theme.font_size,
            config.layout.line_height,
        ));
    }
    TextMetrics::load(&FontSettings {
        family: &config.theme.font_family,
        font_file: config.render.font_file.as_deref(),
        font_size: config.theme.font_size,
        line_height: config.layout.line_height,
    })
}

/// Configuration plus the measurement context it needs, created once and
/// reused for every render.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: Config,
    metrics: TextMetrics,
}

impl Renderer {
    pub fn new(config: Config) -> Result<Self, RenderError> {
        let metrics = load_metrics(&config)?;
        Ok(Self { config, metrics })
    }

    pub fn with_metrics(config: Config, metrics: TextMetrics) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &TextMetrics {
        &self.metrics
    }

    pub fn parse(&self, source: &str) -> Sequence {
        parse_program(source, &self.config.parser)
    }

    pub fn place(&self, program: &Sequence) -> PlacedFigure {
        place_program(program, &self.metrics, &self.config)
    }

    pub fn render(&self, program: &Sequence, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        render_to_image(program, &self.metrics, &self.config, format)
    }

    pub fn render_source(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        render_source(source, &self.metrics, &self.config, format)
    }
}

pub struct SvgSurface<'a> {
    theme: &'a Theme,
    width: f32,
    height: f32,
    body: String,
}

impl<'a> SvgSurface<'a> {
    pub fn new(width: f32, height: f32, theme: &'a Theme) -> Self {
        Self {
            theme,
            width,
            height,
            body: String::new(),
        }
    }

    pub fn finish(self) -> String {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        let mut svg = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&self.theme.background)
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn shape_style(&self) -> String {
        format!(
            "fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(&self.theme.shape_fill),
            escape_xml(&self.theme.shape_stroke),
            self.theme.stroke_width
        )
    }
}

impl Surface for SvgSurface<'_> {
    fn polyline(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        let _ = write!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            points_attr(points),
            escape_xml(&self.theme.line_color),
            self.theme.stroke_width
        );
    }

    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let style = self.shape_style();
        let _ = write!(
            self.body,
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" {style}/>",
        );
    }

    fn rounded_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let style = self.shape_style();
        let radius = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let _ = write!(
            self.body,
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" {style}/>",
        );
    }

    fn polygon(&mut self, points: &[Point]) {
        let style = self.shape_style();
        let _ = write!(
            self.body,
            "<polygon points=\"{}\" {style}/>",
            points_attr(points)
        );
    }

    fn filled_triangle(&mut self, points: [Point; 3]) {
        let _ = write!(
            self.body,
            "<polygon points=\"{}\" fill=\"{}\" stroke=\"none\"/>",
            points_attr(&points),
            escape_xml(&self.theme.arrow_color)
        );
    }

    fn label(&mut self, x: f32, y: f32, text: &str, anchor: TextAnchor) {
        if text.is_empty() {
            return;
        }
        let fill = match anchor {
            TextAnchor::Middle => &self.theme.text_color,
            TextAnchor::Start | TextAnchor::End => &self.theme.branch_label_color,
        };
        // Shift from the vertical middle to the alphabetic baseline.
        let baseline = y + self.theme.font_size * 0.35;
        let _ = write!(
            self.body,
            "<text x=\"{x:.2}\" y=\"{baseline:.2}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            anchor.as_svg(),
            escape_xml(&self.theme.font_family),
            self.theme.font_size,
            escape_xml(fill),
            escape_xml(text)
        );
    }
}

fn points_attr(points: &[Point]) -> String {
    let mut out = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x:.2},{y:.2}");
    }
    out
}

#[cfg(feature = "png")]
pub fn render_png(svg: &str, render_cfg: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(path) = render_cfg.font_file.as_deref() {
        opt.fontdb_mut()
            .load_font_file(path)
            .map_err(|source| RenderError::FontFile {
                path: path.to_path_buf(),
                source,
            })?;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = if render_cfg.scale > 0.0 {
        render_cfg.scale
    } else {
        1.0
    };
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or(RenderError::Pixmap { width, height })?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    tracing::debug!(width, height, "rasterized PNG");
    pixmap
        .encode_png()
        .map_err(|err| RenderError::Encode(err.to_string()))
}

#[cfg(not(feature = "png"))]
pub fn render_png(_svg: &str, _render_cfg: &RenderConfig) -> Result<Vec<u8>, RenderError> {
    Err(RenderError::PngDisabled)
}

pub fn write_output(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
