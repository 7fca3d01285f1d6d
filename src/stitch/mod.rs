//! Merging an ordered list of scrolled screenshots into one tall image.
//!
//! Each consecutive pair is aligned by hashing the middle of every row and
//! searching for the largest overlap whose rows match (see [`overlap`]). The
//! duplicated strip is dropped, and for round displays the corners the screen
//! never showed are masked afterwards.

mod mask;
pub mod overlap;

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::config::{DisplayShape, StitchConfig};

/// Settings for one stitch.
#[derive(Debug, Clone)]
pub struct StitchOptions {
    pub shape: DisplayShape,
    /// Clear off-screen corners instead of painting them with `border_color`.
    pub transparency: bool,
    pub border_color: Rgba<u8>,
    /// Fraction of row hashes that must agree for an overlap to count.
    pub match_threshold: f64,
    pub min_overlap_rows: u32,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self::from_config(&StitchConfig::default())
    }
}

impl StitchOptions {
    pub fn from_config(config: &StitchConfig) -> Self {
        Self {
            shape: config.shape,
            transparency: config.transparency,
            border_color: config.border_color.to_rgba(),
            match_threshold: config.match_threshold,
            min_overlap_rows: config.min_overlap_rows,
        }
    }

    fn corner_fill(&self) -> Rgba<u8> {
        if self.transparency {
            Rgba([0, 0, 0, 0])
        } else {
            self.border_color
        }
    }
}

/// Errors that prevent a stitch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StitchError {
    #[error("Nothing to stitch: no captures")]
    EmptyCaptureSet,

    #[error(
        "Inconsistent capture geometry: capture {index} is {found}px wide, expected {expected}px"
    )]
    InconsistentGeometry {
        index: usize,
        expected: u32,
        found: u32,
    },
}

/// The composite image plus how it was assembled.
#[derive(Debug, Clone)]
pub struct StitchResult {
    pub image: RgbaImage,
    /// Rows shared by capture `i` and `i + 1`; zero where no overlap was found.
    pub overlaps: Vec<u32>,
}

/// Where an output row was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowSource {
    capture: usize,
    row: u32,
}

/// Stitch `captures` (top to bottom, in capture order) into one image.
pub fn stitch(captures: &[RgbaImage], options: &StitchOptions) -> Result<StitchResult, StitchError> {
    let first = captures.first().ok_or(StitchError::EmptyCaptureSet)?;
    let width = first.width();
    if let Some((index, capture)) = captures
        .iter()
        .enumerate()
        .find(|(_, capture)| capture.width() != width)
    {
        return Err(StitchError::InconsistentGeometry {
            index,
            expected: width,
            found: capture.width(),
        });
    }

    let hashes: Vec<Vec<Option<u64>>> = captures
        .iter()
        .map(|capture| overlap::row_hashes(capture, options.shape))
        .collect();
    let mut sources: Vec<RowSource> = (0..first.height())
        .map(|row| RowSource { capture: 0, row })
        .collect();
    let mut overlaps = Vec::with_capacity(captures.len().saturating_sub(1));

    for (index, capture) in captures.iter().enumerate().skip(1) {
        let shared = match overlap::find_overlap(
            &hashes[index - 1],
            &hashes[index],
            options.match_threshold,
            options.min_overlap_rows as usize,
        ) {
            Some(rows) => {
                log::info!("Match for image {}: {} overlapping rows", index, rows);
                rows as u32
            }
            None => {
                log::warn!(
                    "No overlap found between images {} and {}; appending without trimming",
                    index - 1,
                    index
                );
                0
            }
        };

        place_seam(&mut sources, captures, index, shared);
        sources.extend((shared..capture.height()).map(|row| RowSource {
            capture: index,
            row,
        }));
        overlaps.push(shared);
    }

    log::info!(
        "Producing an image of {}x{} from {} captures",
        width,
        sources.len(),
        captures.len()
    );

    let mut image = RgbaImage::new(width, sources.len() as u32);
    for (y, source) in sources.iter().enumerate() {
        let capture = &captures[source.capture];
        for x in 0..width {
            image.put_pixel(x, y as u32, *capture.get_pixel(x, source.row));
        }
    }

    if options.shape.is_round() {
        mask::apply_round_mask(&mut image, &sources, captures, options.corner_fill());
    }

    Ok(StitchResult { image, overlaps })
}

/// Within the overlap, take each row from whichever capture showed it nearer
/// to the screen centre. The row count is unchanged.
fn place_seam(sources: &mut [RowSource], captures: &[RgbaImage], index: usize, shared: u32) {
    let base = sources.len() - shared as usize;
    let incoming_height = captures[index].height();

    for row in 0..shared {
        let slot = &mut sources[base + row as usize];
        let current_height = captures[slot.capture].height();
        if centre_distance(row, incoming_height) < centre_distance(slot.row, current_height) {
            *slot = RowSource {
                capture: index,
                row,
            };
        }
    }
}

/// Twice the distance from `row` to the vertical centre of a screen `height` tall.
fn centre_distance(row: u32, height: u32) -> u64 {
    (2 * row as i64 - (height as i64 - 1)).unsigned_abs()
}
