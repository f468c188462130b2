use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::models::{AnalysisSet, SegmentAnalysis};

/// Parse a phrase analysis file (a JSON array of per-segment analyses)
pub fn parse_analysis_file(path: &Path) -> Result<AnalysisSet> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_analysis_json(&content).with_context(|| format!("Invalid analysis file: {:?}", path))
}

pub fn parse_analysis_json(json: &str) -> Result<AnalysisSet> {
    let analyses: Vec<SegmentAnalysis> =
        serde_json::from_str(json).context("Failed to parse analysis JSON")?;

    let mut seen = std::collections::HashSet::new();
    for analysis in &analyses {
        if !seen.insert(analysis.segment) {
            warn!(
                "Segment {} has more than one analysis, the last one wins",
                analysis.segment
            );
        }
    }

    Ok(AnalysisSet::new(analyses))
}
