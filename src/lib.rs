pub mod config;
pub mod error;
pub mod io;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use config::{AlignerConfig, MatcherKind, RemapConfig, SegmenterConfig, SyncConfig, VocabConfig};
pub use error::ValidationError;
pub use io::{
    parse_analysis_file, parse_transcript_file, parse_transcript_json, write_segment_requests,
    HumanReport, MachineOutput, SegmentRequest, SyncMetadata,
};
pub use matching::{normalize, remap, TimeRemapper};
pub use models::{AnalysisSet, MatchQuality, Segment, Transcript, VocabMap, Word};
pub use pipeline::{SyncPipeline, SyncResult};
pub use stages::{execute_stage3, segment, PhraseAligner, Stage3Config, VocabResolver};
