//! Text reports for duplicate scans and rebuild totals.

use std::io::{self, Write};
use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::warn;

use cxr_prep_core::RunTally;

use crate::classes::ClassDuplicates;
use crate::duplicates::DuplicatePair;

const SHADES: &[u8] = b" .:-=+*#%@";

/// Counters describing what a report run managed to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Example pairs rendered successfully.
    pub examples_shown: usize,
    /// Example pairs that could not be loaded.
    pub examples_failed: usize,
}

/// Renders per-class duplicate counts with example image pairs.
#[derive(Debug, Clone)]
pub struct DuplicateReporter {
    max_examples: usize,
    thumbnail: Option<(u32, u32)>,
}

impl DuplicateReporter {
    /// Create a reporter showing up to `max_examples` pairs per class.
    pub fn new(max_examples: usize) -> Self {
        Self {
            max_examples,
            thumbnail: Some((24, 10)),
        }
    }

    /// Set the thumbnail size in characters, or disable thumbnails.
    pub fn with_thumbnail(mut self, size: Option<(u32, u32)>) -> Self {
        self.thumbnail = size;
        self
    }

    /// Write the per-class section for every class.
    ///
    /// A pair whose images cannot be loaded is reported inline and the rest
    /// of the report continues.
    pub fn render_classes<W: Write>(
        &self,
        duplicates: &ClassDuplicates,
        out: &mut W,
    ) -> io::Result<ReportOutcome> {
        let mut outcome = ReportOutcome::default();

        for (class, scan) in duplicates.iter() {
            writeln!(out)?;
            writeln!(out, "Class: {class}")?;
            writeln!(out, "Duplicate pairs: {}", scan.pair_count())?;

            for (i, pair) in scan.pairs.iter().take(self.max_examples).enumerate() {
                match self.load_pair(pair) {
                    Ok((dup, orig)) => {
                        self.write_pair(out, i + 1, pair, &dup, &orig)?;
                        outcome.examples_shown += 1;
                    }
                    Err(e) => {
                        warn!(duplicate = %pair.duplicate.display(), error = %e, "example not displayable");
                        writeln!(out, "  Example {}: failed to display: {e}", i + 1)?;
                        outcome.examples_failed += 1;
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Write the final copy/skip totals.
    pub fn render_totals<W: Write>(&self, tally: &RunTally, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "Summary:")?;
        writeln!(out, "Unique files copied: {}", tally.copied)?;
        writeln!(out, "Duplicates skipped: {}", tally.skipped)?;
        Ok(())
    }

    fn load_pair(&self, pair: &DuplicatePair) -> image::ImageResult<(DynamicImage, DynamicImage)> {
        let dup = image::open(&pair.duplicate)?;
        let orig = image::open(&pair.original)?;
        Ok((dup, orig))
    }

    fn write_pair<W: Write>(
        &self,
        out: &mut W,
        number: usize,
        pair: &DuplicatePair,
        dup: &DynamicImage,
        orig: &DynamicImage,
    ) -> io::Result<()> {
        writeln!(
            out,
            "  Example {number}: duplicate {} ({}) | original {} ({})",
            file_name(&pair.duplicate),
            describe(dup),
            file_name(&pair.original),
            describe(orig),
        )?;

        if let Some((width, height)) = self.thumbnail {
            let left = thumbnail(dup, width, height);
            let right = thumbnail(orig, width, height);
            for (l, r) in left.iter().zip(&right) {
                writeln!(out, "    {l} | {r}")?;
            }
        }
        Ok(())
    }
}

impl Default for DuplicateReporter {
    fn default() -> Self {
        Self::new(3)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn describe(img: &DynamicImage) -> String {
    format!("{}x{}, {:?}", img.width(), img.height(), img.color())
}

/// Grayscale ASCII rendering, one string per row.
fn thumbnail(img: &DynamicImage, width: u32, height: u32) -> Vec<String> {
    let small = img
        .resize_exact(width.max(1), height.max(1), FilterType::Triangle)
        .to_luma8();

    small
        .rows()
        .map(|row| {
            row.map(|px| {
                let idx = px.0[0] as usize * (SHADES.len() - 1) / 255;
                SHADES[idx] as char
            })
            .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_thumbnail_shades() {
        let mut img = GrayImage::new(4, 2);
        for x in 0..4 {
            img.put_pixel(x, 0, Luma([0]));
            img.put_pixel(x, 1, Luma([255]));
        }
        let rows = thumbnail(&DynamicImage::ImageLuma8(img), 4, 2);

        assert_eq!(rows, vec!["    ".to_string(), "@@@@".to_string()]);
    }

    #[test]
    fn test_render_totals() {
        let mut tally = RunTally::new();
        tally.record_copy(1);
        tally.record_copy(1);
        tally.record_skip();

        let mut buf = Vec::new();
        DuplicateReporter::default().render_totals(&tally, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Unique files copied: 2"));
        assert!(text.contains("Duplicates skipped: 1"));
    }
}
