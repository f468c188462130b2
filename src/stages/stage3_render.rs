use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::io::{HumanReport, MachineOutput, SyncMetadata};
use crate::matching::TimeRemapper;
use crate::models::Word;
use crate::pipeline::SyncResult;

/// Configuration for Stage 3 rendering
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to generate machine-readable output
    pub generate_machine: bool,
    /// Whether to generate the human review report
    pub generate_human: bool,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            generate_machine: true,
            generate_human: true,
        }
    }
}

/// Result of Stage 3 rendering
#[derive(Debug)]
pub struct Stage3Result {
    /// Path to machine output (if generated)
    pub machine_path: Option<PathBuf>,
    /// Path to human report (if generated)
    pub human_path: Option<PathBuf>,
}

/// Execute Stage 3: Rendering
///
/// Produces two output views:
/// 1. Machine output: JSON with segments, aligned phrases in both time domains, sync words and vocabulary
/// 2. Human report: timestamped phrases with degraded ones flagged for review
pub fn execute_stage3(
    result: &SyncResult,
    words: &[Word],
    remapper: &TimeRemapper,
    metadata: SyncMetadata,
    machine_output: Option<&Path>,
    human_output: Option<&Path>,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut rendered = Stage3Result {
        machine_path: None,
        human_path: None,
    };

    if config.generate_machine {
        if let Some(path) = machine_output {
            info!("Writing machine output to {:?}", path);
            MachineOutput::from_result(result, words, remapper, metadata).write_json(path)?;
            rendered.machine_path = Some(path.to_path_buf());
        }
    }

    if config.generate_human {
        if let Some(path) = human_output {
            info!("Writing human report to {:?}", path);
            HumanReport::new(result).write_file(path)?;
            rendered.human_path = Some(path.to_path_buf());
        }
    }

    Ok(rendered)
}
