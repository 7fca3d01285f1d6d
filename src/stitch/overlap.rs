//! Row hashing and overlap search between consecutive captures.

use image::RgbaImage;

use super::mask::ScreenCircle;
use crate::config::DisplayShape;

const HASH_MULTIPLIER: u64 = 31;

/// Fraction of the row width (from each side) ignored when hashing.
///
/// A round screen cuts off the left and right edges, so only the middle band of
/// each row carries content that is comparable between captures.
const EDGE_FRACTION: f64 = 0.3;

/// Hash the middle band of every row.
///
/// The hash treats the RGB value of each pixel as a polynomial coefficient,
/// modulo 2^64. Alpha is ignored. On a round screen, rows whose band is not
/// entirely inside the visible circle are `None`: they show the black bezel in
/// one capture and content in the next, so they can never be compared.
pub fn row_hashes(image: &RgbaImage, shape: DisplayShape) -> Vec<Option<u64>> {
    let (width, height) = image.dimensions();
    let start = (width as f64 * EDGE_FRACTION) as u32;
    let end = ((width as f64 * (1.0 - EDGE_FRACTION)) as u32).max(start + 1).min(width);
    let circle = shape
        .is_round()
        .then(|| ScreenCircle::for_screen(width, height));

    (0..height)
        .map(|y| {
            if let Some(circle) = &circle
                && !(circle.contains(start, y) && circle.contains(end - 1, y))
            {
                return None;
            }
            Some((start..end).fold(1u64, |hash, x| {
                let [r, g, b, _] = image.get_pixel(x, y).0;
                let rgb = ((r as u64) << 16) | ((g as u64) << 8) | b as u64;
                hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(rgb)
            }))
        })
        .collect()
}

/// Find how many rows at the bottom of `previous` reappear at the top of `next`.
///
/// Candidates are tried from the largest possible overlap down to `min_overlap`;
/// the first one whose fraction of equal row hashes reaches `threshold` wins, so
/// a spurious small match never beats the real one. Only row pairs hashed in
/// both captures are compared, and a candidate needs at least `min_overlap` of
/// them. Returns `None` when nothing qualifies.
pub fn find_overlap(
    previous: &[Option<u64>],
    next: &[Option<u64>],
    threshold: f64,
    min_overlap: usize,
) -> Option<usize> {
    let largest = previous.len().min(next.len());
    let smallest = min_overlap.max(1);
    if smallest > largest {
        return None;
    }

    (smallest..=largest).rev().find(|&overlap| {
        let tail = &previous[previous.len() - overlap..];
        let head = &next[..overlap];
        let (compared, matching) = tail
            .iter()
            .zip(head)
            .filter_map(|pair| match pair {
                (Some(a), Some(b)) => Some(a == b),
                _ => None,
            })
            .fold((0usize, 0usize), |(compared, matching), equal| {
                (compared + 1, matching + usize::from(equal))
            });
        compared >= smallest && matching as f64 >= threshold * compared as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn known(values: impl IntoIterator<Item = u64>) -> Vec<Option<u64>> {
        values.into_iter().map(Some).collect()
    }

    #[test]
    fn identical_rows_hash_equal() {
        let image = RgbaImage::from_fn(10, 3, |x, y| {
            if y == 2 {
                Rgba([9, 9, 9, 255])
            } else {
                Rgba([x as u8, 0, 0, 255])
            }
        });
        let hashes = row_hashes(&image, DisplayShape::Square);
        assert_eq!(hashes.len(), 3);
        assert_eq!(hashes[0], hashes[1]);
        assert_ne!(hashes[1], hashes[2]);
        assert!(hashes.iter().all(Option::is_some));
    }

    #[test]
    fn edges_do_not_affect_hash() {
        let plain = RgbaImage::from_pixel(10, 1, Rgba([50, 50, 50, 255]));
        let mut framed = plain.clone();
        framed.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        framed.put_pixel(9, 0, Rgba([0, 0, 0, 255]));
        assert_eq!(
            row_hashes(&plain, DisplayShape::Square),
            row_hashes(&framed, DisplayShape::Square)
        );
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = RgbaImage::from_pixel(10, 1, Rgba([1, 2, 3, 255]));
        let clear = RgbaImage::from_pixel(10, 1, Rgba([1, 2, 3, 0]));
        assert_eq!(
            row_hashes(&opaque, DisplayShape::Square),
            row_hashes(&clear, DisplayShape::Square)
        );
    }

    #[test]
    fn narrow_images_still_hash_a_column() {
        let image = RgbaImage::from_fn(1, 2, |_, y| Rgba([y as u8, 0, 0, 255]));
        let hashes = row_hashes(&image, DisplayShape::Square);
        assert_ne!(hashes[0], hashes[1]);
    }

    #[test]
    fn round_screen_skips_rows_clipped_by_the_circle() {
        let image = RgbaImage::from_pixel(100, 100, Rgba([7, 7, 7, 255]));
        let hashes = row_hashes(&image, DisplayShape::Round);
        assert_eq!(hashes[0], None);
        assert_eq!(hashes[99], None);
        assert!(hashes[10..90].iter().all(Option::is_some));
    }

    #[test]
    fn finds_exact_overlap() {
        let previous = known(0..10);
        let next = known(6..16);
        assert_eq!(find_overlap(&previous, &next, 1.0, 1), Some(4));
    }

    #[test]
    fn prefers_largest_overlap() {
        // The two blank rows alone would also match.
        let previous = known([1, 2, 0, 0, 7, 0, 0]);
        let next = known([0, 0, 7, 0, 0, 8]);
        assert_eq!(find_overlap(&previous, &next, 1.0, 1), Some(5));
    }

    #[test]
    fn tolerates_a_noisy_row() {
        let previous = known(0..40);
        let mut next = known(20..60);
        next[5] = Some(999);
        assert_eq!(find_overlap(&previous, &next, 0.95, 8), Some(20));
        assert_eq!(find_overlap(&previous, &next, 1.0, 8), None);
    }

    #[test]
    fn respects_minimum_overlap() {
        let previous = known(0..10);
        let next = known(8..18);
        assert_eq!(find_overlap(&previous, &next, 1.0, 2), Some(2));
        assert_eq!(find_overlap(&previous, &next, 1.0, 3), None);
    }

    #[test]
    fn unrelated_rows_do_not_match() {
        let previous = known(0..10);
        let next = known(100..110);
        assert_eq!(find_overlap(&previous, &next, 0.95, 1), None);
    }

    #[test]
    fn unhashed_rows_are_left_out_of_the_ratio() {
        // Rows 6..10 of `previous` overlap rows 0..4 of `next`; the bezel rows
        // at either end would otherwise sink the ratio below the threshold.
        let mut previous = known(0..10);
        previous[9] = None;
        let mut next = known(6..16);
        next[0] = None;
        assert_eq!(find_overlap(&previous, &next, 1.0, 2), Some(4));
    }

    #[test]
    fn candidate_needs_enough_comparable_rows() {
        let previous = vec![Some(1), Some(2), None, None];
        let next = vec![None, None, Some(2), Some(3)];
        assert_eq!(find_overlap(&previous, &next, 1.0, 1), None);
    }
}
