use anyhow::{ensure, Context};
use lietouscore::analysis::{PredictionPoint, PredictionSeries, Verdict};
use lietouscore::prelude::{DECEPTION_THRESHOLD, FRAMES_PER_CHUNK};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic prediction series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub chunks: usize,
    pub fps: f64,
    pub frames_per_chunk: u32,
    pub seed: u64,
    pub threshold: f64,
    /// Largest score change between neighbouring chunks.
    pub volatility: f64,
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            chunks: 120,
            fps: 30.0,
            frames_per_chunk: FRAMES_PER_CHUNK,
            seed: 0,
            threshold: DECEPTION_THRESHOLD,
            volatility: 0.15,
            description: None,
        }
    }
}

fn build_points(config: &GeneratorConfig) -> anyhow::Result<Vec<PredictionPoint>> {
    ensure!(
        config.fps.is_finite() && config.fps > 0.0,
        "generator fps must be positive, got {}",
        config.fps
    );
    ensure!(config.frames_per_chunk > 0, "frames_per_chunk must be positive");

    let frames_per_chunk = i64::from(config.frames_per_chunk);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut score: f64 = rng.gen_range(0.2..0.8);
    let mut points = Vec::with_capacity(config.chunks);

    for chunk in 0..config.chunks {
        let start_frame = i64::try_from(chunk)
            .ok()
            .and_then(|index| index.checked_mul(frames_per_chunk))
            .context("overflow computing chunk start frame")?;
        let end_frame = start_frame + frames_per_chunk;
        let center_frame = start_frame + frames_per_chunk / 2;

        if config.volatility > 0.0 {
            score += rng.gen_range(-config.volatility..config.volatility);
        }
        score = score.clamp(0.0, 1.0);

        let verdict = if score > config.threshold {
            Verdict::Deceptive
        } else {
            Verdict::Truthful
        };
        // same formula the analysis service uses: distance from the undecided midpoint
        let confidence = (2.0 * (score - 0.5).abs()).min(1.0);

        points.push(PredictionPoint {
            chunk_start_frame: Some(start_frame),
            chunk_end_frame: Some(end_frame),
            frame: Some(center_frame),
            time_seconds: Some(center_frame as f64 / config.fps),
            ..PredictionPoint::new(
                start_frame as f64 / config.fps,
                end_frame as f64 / config.fps,
                score,
                confidence,
                verdict,
            )
        });
    }

    Ok(points)
}

pub fn build_series_from_config(config: &GeneratorConfig) -> anyhow::Result<PredictionSeries> {
    let points = build_points(config)?;
    PredictionSeries::new(points).context("assembling synthetic prediction series")
}

#[cfg(test)]
pub fn build_series(chunks: usize, fps: f64) -> anyhow::Result<PredictionSeries> {
    let config = GeneratorConfig {
        chunks,
        fps,
        ..Default::default()
    };
    build_series_from_config(&config)
}
