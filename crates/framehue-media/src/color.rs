//! Pixel-level color estimators.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use framehue_models::Rgb;
use image::{DynamicImage, RgbaImage};

use crate::error::{MediaError, MediaResult};
use crate::source::ColorEstimator;

/// Channel width of one dominant-color bucket.
const DOMINANT_DIVIDER: u16 = 24;

/// Supported color algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorAlgorithm {
    /// Average of the most populated color bucket
    #[default]
    Dominant,
    /// Root-mean-square average of all pixels
    Sqrt,
}

impl ColorAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dominant => "dominant",
            Self::Sqrt => "sqrt",
        }
    }

    /// Build the estimator for this algorithm.
    pub fn estimator(self) -> Arc<dyn ColorEstimator> {
        match self {
            Self::Dominant => Arc::new(DominantColorEstimator),
            Self::Sqrt => Arc::new(AverageColorEstimator),
        }
    }
}

impl FromStr for ColorAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dominant" => Ok(Self::Dominant),
            "sqrt" | "average" => Ok(Self::Sqrt),
            other => Err(format!("Unknown color algorithm: {}", other)),
        }
    }
}

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

/// Average color of the most populated bucket.
///
/// Ties are broken towards the lowest bucket key so results are stable.
pub fn dominant_color(image: &RgbaImage) -> Option<Rgb> {
    let mut buckets: HashMap<(u16, u16, u16), Bucket> = HashMap::new();

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let key = (
            u16::from(r) / DOMINANT_DIVIDER,
            u16::from(g) / DOMINANT_DIVIDER,
            u16::from(b) / DOMINANT_DIVIDER,
        );
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.r += u64::from(r);
        bucket.g += u64::from(g);
        bucket.b += u64::from(b);
    }

    let (_, best) = buckets
        .iter()
        .max_by(|(ka, a), (kb, b)| a.count.cmp(&b.count).then_with(|| kb.cmp(ka)))?;

    let mean = |sum: u64| ((sum as f64 / best.count as f64).round()) as u8;
    Some(Rgb::new(mean(best.r), mean(best.g), mean(best.b)))
}

/// Root-mean-square average over all opaque pixels.
pub fn sqrt_average_color(image: &RgbaImage) -> Option<Rgb> {
    let mut count = 0u64;
    let (mut r, mut g, mut b) = (0f64, 0f64, 0f64);

    for pixel in image.pixels() {
        let [pr, pg, pb, a] = pixel.0;
        if a == 0 {
            continue;
        }
        count += 1;
        r += f64::from(pr).powi(2);
        g += f64::from(pg).powi(2);
        b += f64::from(pb).powi(2);
    }

    if count == 0 {
        return None;
    }

    let channel = |sum: f64| (sum / count as f64).sqrt().round().min(255.0) as u8;
    Some(Rgb::new(channel(r), channel(g), channel(b)))
}

fn empty_frame() -> MediaError {
    MediaError::InvalidVideo("Frame contains no opaque pixels".to_string())
}

/// Dominant color estimator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DominantColorEstimator;

#[async_trait]
impl ColorEstimator for DominantColorEstimator {
    async fn estimate(&self, frame: &DynamicImage) -> MediaResult<Rgb> {
        dominant_color(&frame.to_rgba8()).ok_or_else(empty_frame)
    }
}

/// Root-mean-square average color estimator.
#[derive(Debug, Default, Clone, Copy)]
pub struct AverageColorEstimator;

#[async_trait]
impl ColorEstimator for AverageColorEstimator {
    async fn estimate(&self, frame: &DynamicImage) -> MediaResult<Rgb> {
        sqrt_average_color(&frame.to_rgba8()).ok_or_else(empty_frame)
    }
}
