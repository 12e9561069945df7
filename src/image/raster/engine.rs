//! Bundled raster engine.
//!
//! Decodes with `image`, resizes per directive job, encodes webp/png/jpeg with
//! `image` and avif with `ravif`, then writes content-hashed files.
//!
//! # Jobs
//!
//! List directives expand into the cartesian product `format × w × h`, in
//! directive order:
//!
//! ```text
//! format=webp&w=200;400  ->  [webp 200w, webp 400w]
//! ```

use anyhow::{Context, Result, anyhow, bail};
use image::{DynamicImage, imageops::FilterType};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::{EncodeFormat, ProcessedVariant, RasterEngine};
use crate::config::OutputConfig;
use crate::debug;
use crate::directive::DirectiveSet;
use crate::utils::hash::filename_hash;

const DEFAULT_QUALITY: u8 = 75;

/// Raster extensions `image` is built without a decoder for. AVIF is
/// output-only here: `ravif` encodes it, nothing decodes it.
const ENCODE_ONLY: &[&str] = &[".avif"];

/// Engine writing variants into `[output].dir`.
#[derive(Debug, Clone)]
pub struct ImageEngine {
    output: OutputConfig,
}

impl ImageEngine {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            output: output.clone(),
        }
    }
}

impl RasterEngine for ImageEngine {
    async fn process(
        &self,
        source: &Path,
        directives: &DirectiveSet,
    ) -> Result<Vec<ProcessedVariant>> {
        let jobs = plan_jobs(directives)?;
        let bytes = tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read {}", source.display()))?;

        let output = self.output.clone();
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();

        tokio::task::spawn_blocking(move || render_jobs(&bytes, &jobs, &output, &stem))
            .await
            .map_err(|e| anyhow!("raster engine task failed: {e}"))?
    }

    fn decodes(&self, extension: &str) -> bool {
        !ENCODE_ONLY.contains(&extension)
    }
}

/// One resize/encode job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Job {
    width: Option<u32>,
    height: Option<u32>,
    format: EncodeFormat,
    quality: u8,
    without_enlargement: bool,
}

/// Expand list directives into concrete jobs.
fn plan_jobs(directives: &DirectiveSet) -> Result<Vec<Job>> {
    let formats = match directives.list("format").as_slice() {
        [] => vec![EncodeFormat::Png],
        names => names
            .iter()
            .map(|name| {
                EncodeFormat::from_name(name).ok_or_else(|| anyhow!("unsupported format `{name}`"))
            })
            .collect::<Result<_>>()?,
    };

    let quality = match directives.get("quality") {
        Some(q) => q
            .parse::<u8>()
            .ok()
            .filter(|q| (1..=100).contains(q))
            .ok_or_else(|| anyhow!("invalid quality `{q}`"))?,
        None => DEFAULT_QUALITY,
    };

    let widths = parse_sizes(directives, "w")?;
    let heights = parse_sizes(directives, "h")?;
    let without_enlargement = directives.has("withoutEnlargement");

    let mut jobs = Vec::with_capacity(formats.len() * widths.len() * heights.len());
    for &format in &formats {
        for &width in &widths {
            for &height in &heights {
                jobs.push(Job {
                    width,
                    height,
                    format,
                    quality,
                    without_enlargement,
                });
            }
        }
    }
    Ok(jobs)
}

/// Sizes of a list directive; `[None]` when absent.
fn parse_sizes(directives: &DirectiveSet, key: &str) -> Result<Vec<Option<u32>>> {
    let values = directives.list(key);
    if values.is_empty() {
        return Ok(vec![None]);
    }
    values
        .into_iter()
        .map(|v| match v.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(anyhow!("invalid `{key}` directive value `{v}`")),
        })
        .collect()
}

/// Final output dimensions for a job on a `source`-sized image.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn target_size(job: &Job, source: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (f64::from(source.0), f64::from(source.1));
    let scale = |n: f64| (n.round() as u32).max(1);

    match (job.width, job.height) {
        (None, None) => source,
        (Some(w), None) => {
            let w = if job.without_enlargement { w.min(source.0) } else { w };
            (w, scale(sh * f64::from(w) / sw))
        }
        (None, Some(h)) => {
            let h = if job.without_enlargement { h.min(source.1) } else { h };
            (scale(sw * f64::from(h) / sh), h)
        }
        (Some(w), Some(h)) => {
            let factor = if job.without_enlargement {
                (sw / f64::from(w)).min(sh / f64::from(h)).min(1.0)
            } else {
                1.0
            };
            (scale(f64::from(w) * factor), scale(f64::from(h) * factor))
        }
    }
}

fn render_jobs(
    bytes: &[u8],
    jobs: &[Job],
    output: &OutputConfig,
    stem: &str,
) -> Result<Vec<ProcessedVariant>> {
    let image = image::load_from_memory(bytes).context("Failed to decode image")?;
    let source = (image.width(), image.height());

    fs::create_dir_all(&output.dir)
        .with_context(|| format!("Failed to create {}", output.dir.display()))?;

    jobs.par_iter()
        .map(|job| -> Result<ProcessedVariant> {
            let (width, height) = target_size(job, source);
            let resized = resize(&image, job, (width, height), source);
            let encoded = encode(&resized, job.format, job.quality)?;

            let filename = format!(
                "{}-{}.{}",
                stem,
                filename_hash(&encoded),
                job.format.extension()
            );
            let path = write_variant(&output.dir, &filename, &encoded)?;
            debug!("raster"; "{} ({width}x{height})", path.display());

            Ok(ProcessedVariant {
                src: output.url_for(&filename),
                width,
                height,
                format: job.format,
            })
        })
        .collect()
}

fn resize(image: &DynamicImage, job: &Job, target: (u32, u32), source: (u32, u32)) -> DynamicImage {
    if target == source {
        return image.clone();
    }
    if job.width.is_some() && job.height.is_some() {
        image.resize_to_fill(target.0, target.1, FilterType::Lanczos3)
    } else {
        image.resize_exact(target.0, target.1, FilterType::Lanczos3)
    }
}

/// Encode one variant.
///
/// `quality` applies to jpeg and avif. WebP goes through `image`'s encoder,
/// which is lossless only, so webp variants ignore `quality`.
fn encode(image: &DynamicImage, format: EncodeFormat, quality: u8) -> Result<Vec<u8>> {
    use image::codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder};

    let mut buf = Vec::new();
    match format {
        EncodeFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut buf))?,
        EncodeFormat::Png => image.write_with_encoder(PngEncoder::new(&mut buf))?,
        EncodeFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?,
        EncodeFormat::Avif => buf = encode_avif(image, quality)?,
    }
    Ok(buf)
}

fn encode_avif(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let pixels: Vec<rgb::RGBA8> = rgba
        .pixels()
        .map(|p| rgb::RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();
    let img = ravif::Img::new(pixels.as_slice(), rgba.width() as usize, rgba.height() as usize);

    let encoded = ravif::Encoder::new()
        .with_quality(f32::from(quality))
        .with_speed(6)
        .encode_rgba(img)
        .map_err(|e| anyhow!("avif encoding failed: {e}"))?;
    Ok(encoded.avif_file)
}

/// Write a variant unless an identical one already exists.
fn write_variant(dir: &Path, filename: &str, data: &[u8]) -> Result<PathBuf> {
    let path = dir.join(filename);
    if !path.exists() {
        fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(path)
}

/// Reject an engine result that cannot be rendered.
pub(crate) fn check_variants(variants: &[ProcessedVariant]) -> Result<()> {
    if let Some(v) = variants.iter().find(|v| v.width == 0 || v.height == 0) {
        bail!("variant `{}` has zero size", v.src);
    }
    Ok(())
}
