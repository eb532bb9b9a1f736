use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::render::{ImageFormat, Renderer, write_output};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pflow", version, about = "Render indented pseudocode as a flowchart")]
pub struct Args {
    /// Input file (.flow/.txt, or .md with fenced blocks) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Font file used for measuring and rasterizing labels
    #[arg(long = "font")]
    pub font: Option<PathBuf>,

    /// Measure labels with a built-in width table instead of loading a font
    #[arg(long = "fast-text")]
    pub fast_text: bool,

    /// Write the positioned figure tree as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl From<OutputFormat> for ImageFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Svg => ImageFormat::Svg,
            OutputFormat::Png => ImageFormat::Png,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(font) = &args.font {
        config.render.font_file = Some(font.clone());
    }
    if args.fast_text {
        config.layout.fast_text_metrics = true;
    }
    let renderer = Renderer::new(config).context("failed to prepare text measurement")?;
    let format = ImageFormat::from(args.output_format);

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let programs = if is_markdown {
        extract_flow_blocks(&input)
    } else {
        vec![input]
    };

    if programs.is_empty() {
        return Err(anyhow::anyhow!("No pseudoflow blocks found in input"));
    }

    if programs.len() == 1 {
        let output = match format {
            ImageFormat::Svg => args.output.clone(),
            ImageFormat::Png => Some(ensure_output(&args.output, format)?),
        };
        render_one(&renderer, &programs[0], format, output.as_deref(), args.dump_layout.as_deref())?;
        return Ok(());
    }

    // Multiple programs (Markdown input)
    let outputs = resolve_multi_outputs(args.output.as_deref(), format, programs.len())?;
    let dumps: Vec<Option<PathBuf>> = match args.dump_layout.as_deref() {
        Some(path) => numbered_paths(path, "json", programs.len())
            .into_iter()
            .map(Some)
            .collect(),
        None => vec![None; programs.len()],
    };
    for ((program, output), dump) in programs.iter().zip(&outputs).zip(&dumps) {
        render_one(&renderer, program, format, Some(output), dump.as_deref())?;
    }

    Ok(())
}

fn render_one(
    renderer: &Renderer,
    source: &str,
    format: ImageFormat,
    output: Option<&Path>,
    dump: Option<&Path>,
) -> Result<()> {
    let program = renderer.parse(source);
    if let Some(path) = dump {
        let placed = renderer.place(&program);
        write_layout_dump(path, &placed)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote layout dump");
    }
    let bytes = renderer.render(&program, format)?;
    write_output(&bytes, output)?;
    match output {
        Some(path) => tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote image"),
        None => tracing::info!(bytes = bytes.len(), "wrote image to stdout"),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output(output: &Option<PathBuf>, format: ImageFormat) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        format.extension()
    ))
}

fn extract_flow_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current = Vec::new();
    let mut fence = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if !in_block {
            if let Some(start_fence) = detect_flow_fence(trimmed) {
                in_block = true;
                fence = start_fence;
            }
            continue;
        }
        if is_fence_end(trimmed, &fence) {
            in_block = false;
            blocks.push(current.join("\n"));
            current.clear();
            continue;
        }
        // Keep indentation: it carries the program structure.
        current.push(line.to_string());
    }

    blocks
}

fn detect_flow_fence(line: &str) -> Option<String> {
    for marker in ['`', '~'] {
        let fence_len = line.chars().take_while(|&c| c == marker).count();
        if fence_len < 3 {
            continue;
        }
        let info = line[fence_len..].trim();
        let tag = info.split_whitespace().next().unwrap_or("");
        if matches!(tag, "pseudoflow" | "flow") {
            return Some(line[..fence_len].to_string());
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: ImageFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    Ok(numbered_paths(base, format.extension(), count))
}

/// `out/` becomes `out/flow-N.ext`; `out/chart.svg` becomes `out/chart-N.ext`.
fn numbered_paths(base: &Path, ext: &str, count: usize) -> Vec<PathBuf> {
    if base.is_dir() {
        return (1..=count)
            .map(|idx| base.join(format!("flow-{idx}.{ext}")))
            .collect();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("flow");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    (1..=count)
        .map(|idx| parent.join(format!("{stem}-{idx}.{ext}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_flow_blocks() {
        let input = r#"
text
``` pseudoflow
input n
if n > 0
    print n
```
more
~~~flow
a
~~~
```rust
fn main() {}
```
````flow
b
````
"#;
        let blocks = extract_flow_blocks(input);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "input n\nif n > 0\n    print n");
        assert_eq!(blocks[1], "a");
        assert_eq!(blocks[2], "b");
    }

    #[test]
    fn fence_tag_must_match_exactly() {
        assert_eq!(detect_flow_fence("```flow"), Some("```".to_string()));
        assert_eq!(detect_flow_fence("~~~ pseudoflow title"), Some("~~~".to_string()));
        assert_eq!(detect_flow_fence("```flowchart"), None);
        assert_eq!(detect_flow_fence("``flow"), None);
    }

    #[test]
    fn unterminated_block_is_ignored() {
        assert!(extract_flow_blocks("```flow\na\nb").is_empty());
    }

    #[test]
    fn numbers_outputs_next_to_base_file() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/chart.svg")), ImageFormat::Png, 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/chart-1.png"), PathBuf::from("out/chart-2.png")]
        );
    }

    #[test]
    fn multiple_outputs_need_a_path() {
        assert!(resolve_multi_outputs(None, ImageFormat::Svg, 2).is_err());
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, ImageFormat::Png).is_err());
        let path = ensure_output(&Some(PathBuf::from("a.png")), ImageFormat::Png).unwrap();
        assert_eq!(path, PathBuf::from("a.png"));
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "pflow",
            "-i",
            "prog.flow",
            "-e",
            "png",
            "-o",
            "prog.png",
            "--fast-text",
            "--dump-layout",
            "prog.json",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("prog.flow")));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert!(args.fast_text);
        assert_eq!(args.dump_layout, Some(PathBuf::from("prog.json")));
        assert_eq!(ImageFormat::from(args.output_format), ImageFormat::Png);
    }
}
