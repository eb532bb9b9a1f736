use crate::text_metrics::MetricsError;
use std::path::PathBuf;

/// Failures at the image production boundary. Layout itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[cfg(feature = "png")]
    #[error("failed to re-read generated SVG")]
    Svg(#[from] usvg::Error),
    #[error("failed to load font file {path} for rasterizing")]
    FontFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("a {width}x{height} pixel canvas could not be allocated")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("PNG output is not enabled in this build")]
    PngDisabled,
}
