//! Example: Estimate the key of a single audio file
//!
//! Usage:
//!   cargo run --example analyze_file -- [--realtime] [--seconds S] [--json] <file>
//!
//! Runs the asynchronous estimator end to end (file source, Symphonia decode,
//! paced frame processing). Ctrl-C cancels the analysis.

use std::env;
use std::sync::Arc;

use tonality_dsp::io::{FileSource, SymphoniaDecoder};
use tonality_dsp::{AnalysisConfig, AnalysisError, FramePacing, KeyEstimator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut config = AnalysisConfig::default();
    let mut json = false;
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--realtime" => config.pacing = FramePacing::RealTime,
            "--seconds" => {
                let v = args
                    .first()
                    .ok_or("--seconds requires a value")?
                    .parse::<f32>()?;
                args.remove(0);
                config.seconds_to_analyze = v;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_file [--realtime] [--seconds S] [--json] <file>\n\
                     \n\
                     --realtime   Pace frames across the clip duration\n\
                     --seconds S  Seconds of audio to analyze (default: 18)\n\
                     --json       Print the full estimate as JSON\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let estimator = Arc::new(KeyEstimator::new(
        config,
        Arc::new(FileSource::new()),
        Arc::new(SymphoniaDecoder),
    )?);

    let handle = estimator.spawn(path.clone());
    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match handle.join().await {
        Ok(Some(estimate)) if json => {
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        Ok(Some(estimate)) => {
            println!("Analysis Results for {}:", path);
            println!(
                "  Key: {} / {} (confidence: {:.2})",
                estimate.result.key.name(),
                estimate.result.key.camelot(),
                estimate.result.confidence
            );
            println!("  Clarity: {:.3}", estimate.clarity);
            for (rank, candidate) in estimate.candidates.iter().enumerate() {
                println!(
                    "  #{} {:<4} score={:.3}",
                    rank + 1,
                    candidate.key.name(),
                    candidate.score
                );
            }
            if !estimate.flags.is_empty() {
                println!("  Flags: {:?}", estimate.flags);
            }
            println!(
                "  Processing time: {:.2} ms",
                estimate.metadata.processing_time_ms
            );
        }
        Ok(None) => println!("{}: no tonal content", path),
        Err(AnalysisError::Cancelled) => eprintln!("Cancelled"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
