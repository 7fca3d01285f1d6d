use image::{Rgba, RgbaImage};

use super::RowSource;

/// Pixels this close to the edge of the circle count as off-screen.
const EDGE_MARGIN: f64 = 2.0;

/// The visible disc of a round screen, in capture coordinates.
#[derive(Debug, Clone, Copy)]
pub(super) struct ScreenCircle {
    center_x: f64,
    center_y: f64,
    radius: f64,
}

impl ScreenCircle {
    pub(super) fn for_screen(width: u32, height: u32) -> Self {
        Self {
            center_x: (width as f64 - 1.0) / 2.0,
            center_y: (height as f64 - 1.0) / 2.0,
            radius: (width.min(height) as f64 / 2.0 - EDGE_MARGIN).max(0.0),
        }
    }

    pub(super) fn contains(&self, x: u32, y: u32) -> bool {
        let dx = x as f64 - self.center_x;
        let dy = y as f64 - self.center_y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

/// Mask the parts of a stitched image that a round display never showed.
///
/// Whether a pixel was visible is decided in the coordinates of the capture its
/// row came from. Off-screen pixels in the top and bottom caps (half a screen
/// each) become `fill`; those in between are continued from the pixel two rows
/// above, which hides the notches the circle leaves at every seam.
pub(super) fn apply_round_mask(
    output: &mut RgbaImage,
    sources: &[RowSource],
    captures: &[RgbaImage],
    fill: Rgba<u8>,
) {
    let (Some(first), Some(last)) = (captures.first(), captures.last()) else {
        return;
    };
    let (width, height) = output.dimensions();
    let top_cap = first.height() / 2;
    let bottom_cap = height.saturating_sub(last.height() / 2);

    for (y, source) in (0..height).zip(sources) {
        let (src_width, src_height) = captures[source.capture].dimensions();
        let circle = ScreenCircle::for_screen(src_width, src_height);

        for x in 0..width {
            if circle.contains(x, source.row) {
                continue;
            }

            let pixel = if y >= top_cap && y < bottom_cap && y >= 2 {
                *output.get_pixel(x, y - 2)
            } else {
                fill
            };
            output.put_pixel(x, y, pixel);
        }
    }
}
