use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use phrasesync::{
    execute_stage3, parse_analysis_file, parse_transcript_file, write_segment_requests,
    MatcherKind, SegmentRequest, Stage3Config, SyncConfig, SyncMetadata, SyncPipeline,
};

#[derive(Parser)]
#[command(name = "phrasesync")]
#[command(author, version, about = "Phrase and vocabulary timing for word-timestamped transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(clap::Args)]
struct TuningArgs {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playback rate of the display audio (<1 is slower)
    #[arg(long)]
    speed_factor: Option<f64>,

    /// Seconds subtracted from remapped times
    #[arg(long)]
    display_offset: Option<f64>,

    /// Minimum similarity (0-100) for a confident phrase match
    #[arg(long)]
    min_phrase_score: Option<f64>,

    /// Use exact substring matching instead of fuzzy matching
    #[arg(long)]
    exact: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl TuningArgs {
    fn load(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)?,
            None => SyncConfig::default(),
        };
        if let Some(speed) = self.speed_factor {
            config.remap.speed_factor = speed;
        }
        if let Some(offset) = self.display_offset {
            config.remap.display_offset = offset;
        }
        if let Some(score) = self.min_phrase_score {
            config.aligner.min_match_score = score;
        }
        if self.exact {
            config.aligner.matcher = MatcherKind::Exact;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Group a transcript into segments for external phrase analysis
    Segment {
        /// Input transcript file (Deepgram JSON or plain word list)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for segment requests (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of preceding segments to include as context
        #[arg(long, default_value = "2")]
        context: usize,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Align phrase analyses and vocabulary against a transcript
    Process {
        /// Input transcript file (Deepgram JSON or plain word list)
        #[arg(short, long)]
        input: PathBuf,

        /// Phrase analysis file (JSON array of per-segment analyses)
        #[arg(short, long)]
        analysis: Option<PathBuf>,

        /// Output file for machine-readable results (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human review report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Report segmentation and alignment statistics without writing output
    Analyze {
        /// Input transcript file (Deepgram JSON or plain word list)
        #[arg(short, long)]
        input: PathBuf,

        /// Phrase analysis file (JSON array of per-segment analyses)
        #[arg(short, long)]
        analysis: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Segment {
            input,
            output,
            context,
            tuning,
        } => {
            setup_logging(tuning.verbose);
            segment_transcript(&input, &output, context, tuning.load()?)
        }
        Commands::Process {
            input,
            analysis,
            output,
            human_readable,
            tuning,
        } => {
            setup_logging(tuning.verbose);
            process_transcript(
                &input,
                analysis.as_deref(),
                &output,
                human_readable.as_deref(),
                tuning.load()?,
            )
            .await
        }
        Commands::Analyze {
            input,
            analysis,
            tuning,
        } => {
            setup_logging(tuning.verbose);
            analyze_transcript(&input, analysis.as_deref(), tuning.load()?)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn segment_transcript(input: &Path, output: &Path, context: usize, config: SyncConfig) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = parse_transcript_file(input).context("Failed to parse input transcript")?;
    let pipeline = SyncPipeline::new(config)?;

    let segments = pipeline.segment(&transcript);
    let requests = SegmentRequest::from_segments(&segments, context);
    write_segment_requests(&requests, output)?;

    info!("Wrote {} segments to {:?}", requests.len(), output);
    Ok(())
}

async fn process_transcript(
    input: &Path,
    analysis: Option<&Path>,
    output: &Path,
    human_readable: Option<&Path>,
    config: SyncConfig,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = parse_transcript_file(input).context("Failed to parse input transcript")?;
    info!(
        "Loaded {} words, {} utterance hints, {:.1}s",
        transcript.words.len(),
        transcript.utterances.len(),
        transcript.duration()
    );

    let analyses = match analysis {
        Some(path) => {
            info!("Loading phrase analyses from {:?}", path);
            parse_analysis_file(path).context("Failed to parse phrase analyses")?
        }
        None => {
            info!("No phrase analyses given, every segment uses its own text");
            Default::default()
        }
    };

    let matcher = config.aligner.matcher;
    let pipeline = Arc::new(SyncPipeline::new(config)?);
    let remapper = pipeline.remapper();
    let transcript = Arc::new(transcript);

    let result = Arc::clone(&pipeline)
        .run_concurrent(Arc::clone(&transcript), Arc::new(analyses))
        .await?;

    info!("Stage 3: Rendering output...");
    let metadata = SyncMetadata::from_result(&result, &transcript.words, &remapper, matcher);
    let rendered = execute_stage3(
        &result,
        &transcript.words,
        &remapper,
        metadata,
        Some(output),
        human_readable,
        &Stage3Config::default(),
    )?;

    info!("Output written to {:?}", rendered.machine_path);
    if let Some(human_path) = rendered.human_path {
        info!("Human-readable report written to {:?}", human_path);
    }

    Ok(())
}

fn analyze_transcript(input: &Path, analysis: Option<&Path>, config: SyncConfig) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let transcript = parse_transcript_file(input).context("Failed to parse input transcript")?;
    let analyses = match analysis {
        Some(path) => parse_analysis_file(path).context("Failed to parse phrase analyses")?,
        None => Default::default(),
    };

    let pipeline = SyncPipeline::new(config)?;
    let result = pipeline.run(&transcript, &analyses);

    println!("Transcript Analysis");
    println!("===================");
    println!("Total words: {}", transcript.words.len());
    println!("Utterance hints: {}", transcript.utterances.len());
    println!("Duration: {:.1}s", transcript.duration());
    println!();

    println!("Segments");
    println!("--------");
    println!("Total segments: {}", result.segments.len());
    if !result.segments.is_empty() {
        let counts: Vec<usize> = result.segments.iter().map(|s| s.word_count()).collect();
        let min = counts.iter().min().copied().unwrap_or(0);
        let max = counts.iter().max().copied().unwrap_or(0);
        let avg = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        println!("Words per segment: min {}, max {}, avg {:.1}", min, max, avg);
    }
    println!("Analyses supplied: {}", analyses.len());
    println!();

    println!("Phrases");
    println!("-------");
    println!("Total phrases: {}", result.phrase_count());
    println!("Degraded phrases: {}", result.degraded_count());
    println!("Segments out of order: {}", result.inconsistent_segments());
    println!();

    println!("Vocabulary");
    println!("----------");
    println!("Entries: {}", result.vocab.len());
    println!("With timing: {}", result.vocab.timed_count());
    println!("Items resolved: {}/{}", result.stats.timed, result.stats.candidates);
    println!("Short windows dropped: {}", result.stats.discarded_short);

    Ok(())
}
