//! Bounding-box overlay rendering.
//!
//! Recomputed from the latest merged result for every processed frame,
//! whether or not a fresh network result arrived; between successful
//! fetches the previous boxes persist, matching the demo's canvas
//! behavior. Verdict text goes to the log line, not the image.

use crate::monitor::MergedAnalysis;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const BOX_OK: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_ALERT: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: u32 = 3;

/// Draw face boxes from `analysis` over an RGB frame.
///
/// Returns `None` when the raw buffer does not match the stated
/// dimensions. Boxes are clamped to the frame; a face entirely outside
/// it draws nothing.
pub fn render(
    rgb: &[u8],
    width: u32,
    height: u32,
    analysis: &MergedAnalysis,
) -> Option<RgbImage> {
    let mut img = RgbImage::from_raw(width, height, rgb.to_vec())?;

    // Red boxes when the backend flagged the frame as not a real face.
    let color = match &analysis.security {
        Some(sec) if !sec.is_real_face => BOX_ALERT,
        _ => BOX_OK,
    };

    for face in &analysis.faces {
        let [x, y, w, h] = face.bbox;
        let Some(rect) = clamp_rect(x, y, w, h, width, height) else {
            continue;
        };
        for inset in 0..BOX_THICKNESS {
            let Some(inner) = shrink(rect, inset) else {
                break;
            };
            draw_hollow_rect_mut(&mut img, inner, color);
        }
    }

    Some(img)
}

/// Clamp a float bbox to the frame, returning `None` when nothing of it
/// is visible.
fn clamp_rect(x: f32, y: f32, w: f32, h: f32, width: u32, height: u32) -> Option<Rect> {
    if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
        return None;
    }
    let x0 = x.max(0.0) as u32;
    let y0 = y.max(0.0) as u32;
    let x1 = ((x + w).min(width as f32)).max(0.0) as u32;
    let y1 = ((y + h).min(height as f32)).max(0.0) as u32;
    if x1 <= x0 || y1 <= y0 || x0 >= width || y0 >= height {
        return None;
    }
    Some(Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0))
}

fn shrink(rect: Rect, inset: u32) -> Option<Rect> {
    let double = inset.checked_mul(2)?;
    if rect.width() <= double || rect.height() <= double {
        return None;
    }
    Some(
        Rect::at(rect.left() + inset as i32, rect.top() + inset as i32)
            .of_size(rect.width() - double, rect.height() - double),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use facelens_core::{Face, SecurityResponse};

    fn face(bbox: [f32; 4]) -> Face {
        Face {
            bbox,
            confidence: 0.9,
            landmarks: None,
            gender: None,
            age: None,
        }
    }

    fn gray_frame(width: u32, height: u32) -> Vec<u8> {
        vec![50u8; (width * height * 3) as usize]
    }

    #[test]
    fn test_render_draws_green_box() {
        let analysis = MergedAnalysis {
            faces: vec![face([10.0, 10.0, 40.0, 40.0])],
            security: None,
        };
        let img = render(&gray_frame(100, 100), 100, 100, &analysis).unwrap();
        assert_eq!(img.get_pixel(10, 10), &Rgb([0, 255, 0]));
        // Interior untouched.
        assert_eq!(img.get_pixel(30, 30), &Rgb([50, 50, 50]));
    }

    #[test]
    fn test_render_red_box_when_not_real_face() {
        let analysis = MergedAnalysis {
            faces: vec![face([10.0, 10.0, 40.0, 40.0])],
            security: Some(SecurityResponse {
                is_real_face: false,
                ..Default::default()
            }),
        };
        let img = render(&gray_frame(100, 100), 100, 100, &analysis).unwrap();
        assert_eq!(img.get_pixel(10, 10), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_render_clamps_out_of_frame_box() {
        let analysis = MergedAnalysis {
            faces: vec![face([-20.0, -20.0, 50.0, 50.0])],
            security: None,
        };
        // Must not panic; visible part is drawn from the frame edge.
        let img = render(&gray_frame(100, 100), 100, 100, &analysis).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 255, 0]));
    }

    #[test]
    fn test_render_skips_fully_offscreen_box() {
        let analysis = MergedAnalysis {
            faces: vec![face([500.0, 500.0, 40.0, 40.0])],
            security: None,
        };
        let img = render(&gray_frame(100, 100), 100, 100, &analysis).unwrap();
        // Nothing drawn anywhere.
        assert!(img.pixels().all(|p| p == &Rgb([50, 50, 50])));
    }

    #[test]
    fn test_render_empty_analysis_is_plain_frame() {
        let img = render(&gray_frame(8, 8), 8, 8, &MergedAnalysis::default()).unwrap();
        assert!(img.pixels().all(|p| p == &Rgb([50, 50, 50])));
    }

    #[test]
    fn test_render_rejects_bad_buffer() {
        assert!(render(&[0u8; 10], 100, 100, &MergedAnalysis::default()).is_none());
    }

    #[test]
    fn test_clamp_rect_nan_bbox() {
        assert!(clamp_rect(f32::NAN, 0.0, 10.0, 10.0, 100, 100).is_none());
    }
}
