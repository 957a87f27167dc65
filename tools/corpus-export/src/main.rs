use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chorale_codec::{load_source, ConversionJob, ConversionPipeline};
use chorale_domain::{ExportConfig, JsonExporter, PayloadExporter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export a directory of walked chorale scores as canonical payloads"
)]
struct Args {
    /// Directory holding one walked score JSON per work
    #[arg(long)]
    input_dir: PathBuf,
    /// Where payload files are written
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Maximum number of works to export
    #[arg(long)]
    limit: Option<usize>,
    /// YAML export configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct ExportSummary {
    exported: Vec<String>,
    failed: Vec<String>,
}

fn load_config(args: &Args) -> Result<ExportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {:?}", path))?;
            ExportConfig::from_yaml_str(&text)?
        }
        None => ExportConfig::default(),
    };
    if let Some(out_dir) = &args.out_dir {
        config.out_dir = out_dir.clone();
    }
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    Ok(config)
}

/// Score files in `dir`, sorted by name.
fn score_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {:?}", dir))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn export_one(pipeline: &ConversionPipeline, path: &Path, config: &ExportConfig) -> Result<PathBuf> {
    let work_id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let score = load_source(path)?;
    let job = ConversionJob {
        work_id,
        excerpt: None,
    };
    let payload = pipeline.export(&job, &score, config)?;
    let target = config.out_dir.join(payload.file_name());
    fs::write(&target, JsonExporter.export(&payload)?)
        .with_context(|| format!("write {:?}", target))?;
    Ok(target)
}

fn run(input_dir: &Path, config: &ExportConfig) -> Result<ExportSummary> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("create {:?}", config.out_dir))?;
    let pipeline = ConversionPipeline::with_options(config.timeline);
    let mut summary = ExportSummary::default();
    for path in score_files(input_dir)?.into_iter().take(config.limit) {
        match export_one(&pipeline, &path, config) {
            Ok(target) => {
                info!(source = ?path, target = ?target, "exported work");
                summary.exported.push(target.display().to_string());
            }
            Err(err) => {
                warn!(source = ?path, error = %format!("{err:#}"), "skipping work");
                summary.failed.push(path.display().to_string());
            }
        }
    }
    Ok(summary)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let summary = run(&args.input_dir, &config)?;
    info!(
        exported = summary.exported.len(),
        failed = summary.failed.len(),
        "corpus export finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
