//! Example: Estimate the key of multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use rayon::prelude::*;
use serde::Serialize;
use std::env;
use std::time::Instant;
use tonality_dsp::io::{AudioDecoder, SymphoniaDecoder};
use tonality_dsp::preprocessing::channel_mixer::ChannelMixMode;
use tonality_dsp::{detect_key, AnalysisConfig, AnalysisFlag};

/// One JSONL record per file
#[derive(Debug, Clone, Serialize)]
struct ItemOut {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camelot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clarity: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    flags: Vec<AnalysisFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time_ms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ItemOut {
    fn failed(file: String, error: String) -> Self {
        Self {
            file,
            key: None,
            camelot: None,
            confidence: None,
            clarity: None,
            flags: Vec::new(),
            processing_time_ms: None,
            error: Some(error),
        }
    }

    fn ok(&self) -> bool {
        self.error.is_none()
    }
}

fn analyze_file(path: &str, config: &AnalysisConfig) -> ItemOut {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return ItemOut::failed(path.to_string(), format!("read failed: {e}")),
    };
    let hint = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string);

    let decoded = match SymphoniaDecoder.decode(bytes, hint.as_deref(), Some(config.seconds_to_analyze)) {
        Ok(decoded) => decoded,
        Err(e) => return ItemOut::failed(path.to_string(), format!("decode failed: {e}")),
    };
    let sample_rate = decoded.sample_rate;
    let mono = match decoded.into_mono(ChannelMixMode::FirstChannel) {
        Ok(mono) => mono,
        Err(e) => return ItemOut::failed(path.to_string(), format!("decode failed: {e}")),
    };

    match detect_key(&mono, sample_rate, config) {
        Ok(Some(estimate)) => ItemOut {
            file: path.to_string(),
            key: Some(estimate.result.key.name()),
            camelot: Some(estimate.result.key.camelot()),
            confidence: Some(estimate.result.confidence),
            clarity: Some(estimate.clarity),
            flags: estimate.flags,
            processing_time_ms: Some(estimate.metadata.processing_time_ms),
            error: None,
        },
        Ok(None) => ItemOut {
            file: path.to_string(),
            key: None,
            camelot: None,
            confidence: None,
            clarity: None,
            flags: Vec::new(),
            processing_time_ms: None,
            error: None,
        },
        Err(e) => ItemOut::failed(path.to_string(), format!("analysis failed: {e}")),
    }
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn percentile(mut xs: Vec<f32>, p: f32) -> Option<f32> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let idx = ((xs.len() - 1) as f32 * p.clamp(0.0, 1.0)).round() as usize;
    Some(xs[idx.min(xs.len() - 1)])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> =
        pool.install(|| paths.par_iter().map(|path| analyze_file(path, &config)).collect());

    if json {
        for o in &outs {
            println!("{}", serde_json::to_string(o)?);
        }
    } else {
        for (idx, o) in outs.iter().enumerate() {
            match (&o.error, &o.key) {
                (Some(error), _) => println!(
                    "[{}/{}] {}: ERROR: {}",
                    idx + 1,
                    outs.len(),
                    o.file,
                    error
                ),
                (None, Some(key)) => println!(
                    "[{}/{}] {}: Key={} ({}) conf={:.3} clarity={:.3} time={:.2}ms",
                    idx + 1,
                    outs.len(),
                    o.file,
                    key,
                    o.camelot.as_deref().unwrap_or("-"),
                    o.confidence.unwrap_or(0.0),
                    o.clarity.unwrap_or(0.0),
                    o.processing_time_ms.unwrap_or(0.0)
                ),
                (None, None) => println!(
                    "[{}/{}] {}: no tonal content",
                    idx + 1,
                    outs.len(),
                    o.file
                ),
            }
        }
    }

    let ok_times: Vec<f32> = outs.iter().filter_map(|o| o.processing_time_ms).collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} keyed={} wall={:.0}ms",
        outs.iter().filter(|o| o.ok()).count(),
        outs.len(),
        ok_times.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(ok_times.clone(), 0.50).unwrap_or(mean);
        let p90 = percentile(ok_times.clone(), 0.90).unwrap_or(mean);
        eprintln!(
            "processing_time_ms: mean={:.2} p50={:.2} p90={:.2}",
            mean, p50, p90
        );
    }

    Ok(())
}
