use std::sync::Arc;

use phrasesync::io::parse_analysis_json;
use phrasesync::{
    execute_stage3, parse_analysis_file, parse_transcript_file, parse_transcript_json,
    MatchQuality, RemapConfig, Stage3Config, SyncConfig, SyncMetadata, SyncPipeline,
};

const DEEPGRAM: &str = r#"{
    "results": {
        "channels": [{
            "alternatives": [{
                "words": [
                    {"word": "今日", "start": 0.2, "end": 0.5, "punctuated_word": "今日"},
                    {"word": "は", "start": 0.5, "end": 0.6, "punctuated_word": "は、"},
                    {"word": "東京", "start": 0.8, "end": 1.2},
                    {"word": "タワー", "start": 1.2, "end": 1.8},
                    {"word": "に", "start": 1.8, "end": 1.9},
                    {"word": "行き", "start": 2.0, "end": 2.4},
                    {"word": "ました", "start": 2.4, "end": 2.9, "punctuated_word": "ました。"},
                    {"word": "景色", "start": 3.5, "end": 4.0},
                    {"word": "が", "start": 4.0, "end": 4.1},
                    {"word": "とても", "start": 4.2, "end": 4.6},
                    {"word": "綺麗", "start": 4.6, "end": 5.0},
                    {"word": "でした", "start": 5.0, "end": 5.5, "punctuated_word": "でした。"}
                ]
            }]
        }],
        "utterances": [
            {"start": 0.2, "end": 2.9},
            {"start": 3.5, "end": 5.5}
        ]
    }
}"#;

const ANALYSES: &str = r#"[
    {
        "segment": 0,
        "phrases": [
            {
                "text": "今日は、",
                "words": [{"japanese": "今日", "kanji": "今日", "romaji": "kyō", "meaning": "today"}],
                "kanji_explanations": [{"kanji": "今", "reading": "きょう", "meaning": "now"}]
            },
            {
                "text": "東京タワーに",
                "words": [{"japanese": "東京タワー", "kanji": "東京", "meaning": "Tokyo Tower"}]
            },
            {
                "text": "行きました。",
                "words": [{"japanese": "行き", "kanji": "行", "meaning": "go"}]
            }
        ]
    },
    {
        "segment": 1,
        "phrases": [
            {"text": "景色が", "words": [{"japanese": "景色", "kanji": "景色", "meaning": "scenery"}]},
            {"text": "とても綺麗でした。", "words": [{"japanese": "綺麗", "kanji": "綺麗", "meaning": "pretty"}]}
        ]
    }
]"#;

fn identity_config() -> SyncConfig {
    SyncConfig {
        remap: RemapConfig {
            speed_factor: 1.0,
            display_offset: 0.0,
            min_display_end: 0.01,
        },
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_alignment() {
    let transcript = parse_transcript_json(DEEPGRAM).unwrap();
    let analyses = parse_analysis_json(ANALYSES).unwrap();
    let pipeline = SyncPipeline::new(identity_config()).unwrap();

    let result = pipeline.run(&transcript, &analyses);

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].word_range, 0..7);
    assert_eq!(result.segments[1].word_range, 7..12);

    let first = &result.alignments[0].phrases;
    assert_eq!(first[0].word_range, 0..2);
    assert_eq!(first[1].word_range, 2..5);
    assert_eq!(first[2].word_range, 5..7);
    assert!((first[1].start - 0.8).abs() < 1e-9);
    assert!((first[1].end - 1.9).abs() < 1e-9);
    assert_eq!(result.degraded_count(), 0);

    let tower = result.vocab.get("東京タワー").unwrap().timing().unwrap();
    assert!((tower.start - 0.8).abs() < 1e-9);
    assert!((tower.end - 1.8).abs() < 1e-9);

    let today = result.vocab.get("今日").unwrap();
    assert_eq!(today.kanji_readings.get("今").map(String::as_str), Some("きょう"));
    assert_eq!(result.vocab.timed_count(), 5);
}

#[test]
fn test_phrase_ranges_never_overlap() {
    let transcript = parse_transcript_json(DEEPGRAM).unwrap();
    let analyses = parse_analysis_json(ANALYSES).unwrap();
    let result = SyncPipeline::new(SyncConfig::default())
        .unwrap()
        .run(&transcript, &analyses);

    for alignment in &result.alignments {
        for pair in alignment.phrases.windows(2) {
            assert!(pair[0].word_range.end <= pair[1].word_range.start);
            assert!(pair[0].start <= pair[1].start);
        }
    }
}

#[test]
fn test_segments_conserve_words() {
    let transcript = parse_transcript_json(DEEPGRAM).unwrap();
    let pipeline = SyncPipeline::new(SyncConfig::default()).unwrap();
    let segments = pipeline.segment(&transcript);

    let covered: usize = segments.iter().map(|s| s.word_count()).sum();
    assert_eq!(covered, transcript.words.len());
    assert_eq!(segments.first().map(|s| s.word_range.start), Some(0));
    for pair in segments.windows(2) {
        assert_eq!(pair[0].word_range.end, pair[1].word_range.start);
    }
}

#[test]
fn test_out_of_order_analysis_is_flagged() {
    let transcript = parse_transcript_json(DEEPGRAM).unwrap();
    // Phrases of segment 0 supplied in reverse order
    let analyses = parse_analysis_json(
        r#"[{"segment": 0, "phrases": [
            {"text": "行きました。"},
            {"text": "東京タワーに"},
            {"text": "今日は、"}
        ]}]"#,
    )
    .unwrap();

    let result = SyncPipeline::new(SyncConfig::default())
        .unwrap()
        .run(&transcript, &analyses);

    let alignment = &result.alignments[0];
    assert!(!alignment.order_consistent);
    assert_eq!(alignment.phrases[0].quality, MatchQuality::Confident);
    assert_eq!(alignment.phrases[1].quality, MatchQuality::NoConfidentMatch);
    assert_eq!(alignment.phrases[2].quality, MatchQuality::NoConfidentMatch);
    assert_eq!(result.inconsistent_segments(), 1);
    for pair in alignment.phrases.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}

#[tokio::test]
async fn test_concurrent_run_matches_sequential() {
    let transcript = parse_transcript_json(DEEPGRAM).unwrap();
    let analyses = parse_analysis_json(ANALYSES).unwrap();
    let pipeline = SyncPipeline::new(SyncConfig::default()).unwrap();

    let sequential = pipeline.run(&transcript, &analyses);
    let concurrent = Arc::new(pipeline)
        .run_concurrent(Arc::new(transcript), Arc::new(analyses))
        .await
        .unwrap();

    assert_eq!(concurrent.alignments, sequential.alignments);
    assert_eq!(concurrent.vocab, sequential.vocab);
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let transcript_path = dir.path().join("transcript.json");
    let analysis_path = dir.path().join("analysis.json");
    let config_path = dir.path().join("config.json");
    let machine_path = dir.path().join("out.json");
    let human_path = dir.path().join("out.txt");

    std::fs::write(&transcript_path, DEEPGRAM).unwrap();
    std::fs::write(&analysis_path, ANALYSES).unwrap();
    std::fs::write(&config_path, r#"{"remap": {"speed_factor": 0.5}}"#).unwrap();

    let config = SyncConfig::from_file(&config_path).unwrap();
    assert_eq!(config.remap.speed_factor, 0.5);
    assert_eq!(config.remap.display_offset, 0.3);

    let transcript = parse_transcript_file(&transcript_path).unwrap();
    let analyses = parse_analysis_file(&analysis_path).unwrap();
    let matcher = config.aligner.matcher;
    let pipeline = SyncPipeline::new(config).unwrap();
    let remapper = pipeline.remapper();
    let result = pipeline.run(&transcript, &analyses);

    let metadata = SyncMetadata::from_result(&result, &transcript.words, &remapper, matcher);
    execute_stage3(
        &result,
        &transcript.words,
        &remapper,
        metadata,
        Some(&machine_path),
        Some(&human_path),
        &Stage3Config::default(),
    )
    .unwrap();

    let machine: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&machine_path).unwrap()).unwrap();
    assert_eq!(machine["segments"].as_array().unwrap().len(), 2);
    assert_eq!(machine["metadata"]["total_words"], 12);
    assert_eq!(machine["metadata"]["speed_factor"], 0.5);
    assert!(machine["vocabulary"]["東京タワー"]["start"].is_number());

    let human = std::fs::read_to_string(&human_path).unwrap();
    assert!(human.contains("Segment 1: 景色がとても綺麗でした。"));
    assert!(human.contains("Vocabulary"));
}
