//! Renders centroids as grayscale image tiles (binary PGM).

use anyhow::{anyhow, ensure, Context, Result};
use cluster_core::Vector;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Gap in pixels between neighbouring tiles.
const TILE_GAP: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageShape {
    pub height: usize,
    pub width: usize,
}

impl ImageShape {
    pub fn pixels(self) -> usize {
        self.height * self.width
    }
}

impl FromStr for ImageShape {
    type Err = anyhow::Error;

    /// Parses `HEIGHTxWIDTH`, e.g. `28x28`.
    fn from_str(value: &str) -> Result<Self> {
        let (height, width) = value
            .to_ascii_lowercase()
            .split_once('x')
            .map(|(h, w)| (h.trim().to_string(), w.trim().to_string()))
            .ok_or_else(|| anyhow!("image shape '{value}' must look like HEIGHTxWIDTH"))?;
        let shape = Self {
            height: height.parse().with_context(|| format!("invalid height in '{value}'"))?,
            width: width.parse().with_context(|| format!("invalid width in '{value}'"))?,
        };
        ensure!(shape.pixels() > 0, "image shape '{value}' has no pixels");
        Ok(shape)
    }
}

/// 8-bit grayscale raster.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

/// `(rows, cols)` of a near-square grid holding `count` tiles.
pub fn grid_layout(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    (rows, cols)
}

/// Min-max scales one centroid to `0..=255`; a flat centroid renders black.
fn scale_tile(centroid: &[f32]) -> Vec<u8> {
    let (min, max) = centroid
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &value| {
            (lo.min(value), hi.max(value))
        });
    let range = max - min;
    centroid
        .iter()
        .map(|&value| {
            if range > 0.0 {
                ((value - min) / range * 255.0).round() as u8
            } else {
                0
            }
        })
        .collect()
}

/// Tiles every centroid, reshaped to `shape`, into one image in row-major
/// cluster order.
pub fn centroid_grid(centroids: &[Vector], shape: ImageShape) -> Result<GrayImage> {
    ensure!(!centroids.is_empty(), "no centroids to render");
    if let Some((cluster, centroid)) = centroids
        .iter()
        .enumerate()
        .find(|(_, centroid)| centroid.len() != shape.pixels())
    {
        return Err(anyhow!(
            "centroid {cluster} has {} values, image shape {}x{} needs {}",
            centroid.len(),
            shape.height,
            shape.width,
            shape.pixels()
        ));
    }

    let (rows, cols) = grid_layout(centroids.len());
    let width = cols * shape.width + (cols - 1) * TILE_GAP;
    let height = rows * shape.height + (rows - 1) * TILE_GAP;
    let mut pixels = vec![0u8; width * height];

    for (cluster, centroid) in centroids.iter().enumerate() {
        let tile = scale_tile(centroid);
        let origin_x = (cluster % cols) * (shape.width + TILE_GAP);
        let origin_y = (cluster / cols) * (shape.height + TILE_GAP);
        for (row, line) in tile.chunks(shape.width).enumerate() {
            let start = (origin_y + row) * width + origin_x;
            pixels[start..start + shape.width].copy_from_slice(line);
        }
    }

    Ok(GrayImage {
        width,
        height,
        pixels,
    })
}

pub fn write_pgm(path: &Path, image: &GrayImage) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create image at {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P5\n{} {}\n255\n", image.width, image.height)?;
    writer.write_all(&image.pixels)?;
    writer
        .flush()
        .with_context(|| format!("failed to write image at {}", path.display()))?;
    Ok(())
}

/// Renders and saves the centroid grid in one step.
pub fn write_centroid_grid(path: &Path, centroids: &[Vector], shape: ImageShape) -> Result<()> {
    let image = centroid_grid(centroids, shape)?;
    write_pgm(path, &image)
}
