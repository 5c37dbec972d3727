//! Performance benchmarks for key analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tonality_dsp::features::chroma::PitchClassHistogram;
use tonality_dsp::features::key::rank_candidates;
use tonality_dsp::features::spectrum::{FftSpectrumBackend, SpectrumBackend};
use tonality_dsp::{detect_key, AnalysisConfig};

fn bench_detect_key(c: &mut Criterion) {
    // Synthetic C major triad (18 seconds at 44.1kHz)
    let samples: Vec<f32> = (0..44100 * 18)
        .map(|i| {
            let t = i as f32 / 44100.0;
            [261.63f32, 329.63, 392.0]
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                / 3.0
        })
        .collect();

    let config = AnalysisConfig::default();

    c.bench_function("detect_key_18s", |b| {
        b.iter(|| {
            let _ = detect_key(black_box(&samples), black_box(44100), black_box(&config));
        });
    });
}

fn bench_spectrum_frame(c: &mut Criterion) {
    let window: Vec<f32> = (0..4096)
        .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / 44100.0).sin())
        .collect();
    let mut out = vec![0.0f32; 2048];
    let mut analyzer = match FftSpectrumBackend.create(4096) {
        Ok(analyzer) => analyzer,
        Err(e) => panic!("backend: {}", e),
    };

    c.bench_function("magnitude_db_4096", |b| {
        b.iter(|| {
            let _ = analyzer.magnitude_db(black_box(&window), &mut out);
        });
    });
}

fn bench_rank_candidates(c: &mut Criterion) {
    let histogram = PitchClassHistogram::new([
        0.3, 0.02, 0.1, 0.02, 0.2, 0.1, 0.02, 0.15, 0.02, 0.05, 0.01, 0.01,
    ]);

    c.bench_function("rank_candidates_24", |b| {
        b.iter(|| rank_candidates(black_box(&histogram)));
    });
}

criterion_group!(
    benches,
    bench_detect_key,
    bench_spectrum_frame,
    bench_rank_candidates
);
criterion_main!(benches);
