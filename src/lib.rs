#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod draw;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod surface;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ParserConfig, RenderConfig};
pub use error::RenderError;
pub use ir::{Sequence, Statement};
pub use layout::layout_program;
pub use parser::parse_program;
pub use render::{ImageFormat, Renderer, render_source, render_svg, render_to_image};
pub use text_metrics::{MetricsError, TextMetrics};
pub use theme::Theme;
