use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use chorale_domain::{
    CirDocument, DomainError, Event, ExportConfig, ExportPayload, Excerpt, SourceScore,
    TimelineOptions,
};

use crate::assembler::CirAssembler;
use crate::timeline::EventTimelineBuilder;

/// Both derived artifacts of one score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversion {
    pub score: CirDocument,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionJob {
    pub work_id: String,
    #[serde(default)]
    pub excerpt: Option<Excerpt>,
}

impl ConversionJob {
    /// Display title: the work id, with the measure range for excerpts.
    pub fn title(&self, total_measures: usize) -> String {
        match self.excerpt {
            Some(excerpt) => excerpt.title(&self.work_id, total_measures),
            None => self.work_id.clone(),
        }
    }
}

pub struct ConversionPipeline {
    assembler: CirAssembler,
    timeline: EventTimelineBuilder,
}

impl ConversionPipeline {
    pub fn new() -> Self {
        Self::with_options(TimelineOptions::default())
    }

    pub fn with_options(options: TimelineOptions) -> Self {
        Self {
            assembler: CirAssembler::new(),
            timeline: EventTimelineBuilder::new(options),
        }
    }

    pub fn convert(&self, score: &SourceScore) -> Result<Conversion, DomainError> {
        let score = self.assembler.assemble(score)?;
        let events = self.timeline.build(&score);
        Ok(Conversion { score, events })
    }

    /// Converts, trims to the job's excerpt, and rebuilds the events over
    /// the kept measures.
    #[instrument(skip(self, score, config), fields(work_id = %job.work_id))]
    pub fn export(
        &self,
        job: &ConversionJob,
        score: &SourceScore,
        config: &ExportConfig,
    ) -> Result<ExportPayload, DomainError> {
        let mut conversion = self.convert(score)?;
        let title = job.title(conversion.score.measures.len());
        if let Some(excerpt) = job.excerpt {
            let trimmed = excerpt.apply(&conversion.score)?;
            conversion = Conversion {
                events: self.timeline.build(&trimmed),
                score: trimmed,
            };
        }
        info!(
            %title,
            measures = conversion.score.measures.len(),
            events = conversion.events.len(),
            "converted score"
        );
        Ok(ExportPayload::new(
            job.work_id.clone(),
            config,
            conversion.score,
            conversion.events,
        ))
    }
}

impl Default for ConversionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads a walked score from a JSON file.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<SourceScore> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open score file {:?}", path))?;
    let score = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse score file {:?}", path))?;
    Ok(score)
}
