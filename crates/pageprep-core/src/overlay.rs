//! Bounding-box overlay rendering.
//!
//! Draws annotation boxes onto a page image so the annotations can be checked
//! by eye. The rendered image is a debugging artifact, never an input to the
//! reformat pipeline.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde_json::Number;

use crate::document::Annotation;

/// Overlay rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Rectangle color (RGBA).
    pub color: Rgba<u8>,
    /// Rectangle line thickness in pixels.
    pub thickness: u32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            color: Rgba([255, 0, 0, 255]),
            thickness: 3,
        }
    }
}

/// Draw every annotation's bounding box onto `img` as a hollow rectangle.
///
/// Boxes are clamped to the image bounds, and a box that clamps away to
/// nothing is skipped. Thickness is rendered as nested one-pixel rectangles
/// inset toward the box center.
pub fn draw_annotations(img: &mut RgbaImage, annotations: &[Annotation], options: &OverlayOptions) {
    let (img_width, img_height) = img.dimensions();

    for annotation in annotations {
        let value = |n: &Number| n.as_f64().unwrap_or(0.0);
        let x = value(&annotation.bbox[0]) as i32;
        let y = value(&annotation.bbox[1]) as i32;
        let w = value(&annotation.bbox[2]) as u32;
        let h = value(&annotation.bbox[3]) as u32;

        // Clamp to image bounds
        let x = x.max(0) as u32;
        let y = y.max(0) as u32;
        let w = w.min(img_width.saturating_sub(x));
        let h = h.min(img_height.saturating_sub(y));

        if w > 0 && h > 0 {
            for t in 0..options.thickness {
                let inner_w = w.saturating_sub(2 * t);
                let inner_h = h.saturating_sub(2 * t);
                if inner_w > 0 && inner_h > 0 {
                    let rect = Rect::at((x + t) as i32, (y + t) as i32).of_size(inner_w, inner_h);
                    draw_hollow_rect_mut(img, rect, options.color);
                }
            }
        }
    }
}
