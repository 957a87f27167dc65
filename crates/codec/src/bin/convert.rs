use std::path::PathBuf;

use anyhow::Context;
use chorale_codec::{load_source, ConversionJob, ConversionPipeline};
use chorale_domain::{ExportConfig, Excerpt, JsonExporter, PayloadExporter};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a parsed score into canonical and grading JSON", long_about = None)]
struct Cli {
    /// Path to the walked score JSON
    input: PathBuf,
    /// Identifier recorded in the payload (defaults to the file stem)
    #[arg(long)]
    work_id: Option<String>,
    /// First measure to keep (0-based)
    #[arg(long)]
    start: Option<usize>,
    /// Measure to stop before (exclusive)
    #[arg(long)]
    end: Option<usize>,
    /// Write the payload here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let score = load_source(&cli.input)?;
    let work_id = cli.work_id.unwrap_or_else(|| {
        cli.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "score".to_string())
    });
    let excerpt = match (cli.start, cli.end) {
        (None, None) => None,
        (start, end) => Some(Excerpt::new(start.unwrap_or(0), end)),
    };
    let job = ConversionJob { work_id, excerpt };
    let payload = ConversionPipeline::new().export(&job, &score, &ExportConfig::default())?;
    let bytes = JsonExporter.export(&payload)?;
    match cli.output {
        Some(path) => std::fs::write(&path, &bytes).with_context(|| format!("write {:?}", path))?,
        None => println!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}
