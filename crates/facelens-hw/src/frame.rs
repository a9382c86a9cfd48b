//! Frame type and pixel conversion — YUYV decoding, dark detection,
//! JPEG encoding for upload.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// A captured RGB camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB24 pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
    pub is_dark: bool,
}

impl Frame {
    /// Average pixel brightness (0.0–255.0), mean over all channels.
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }

    /// Encode the frame as JPEG for upload.
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, FrameError> {
        let mut out = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode(
            &self.data,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(out)
    }
}

/// Convert packed YUYV (4:2:2) to RGB24 using BT.601 coefficients.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; U and V are
/// shared by the pixel pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in yuyv[..expected].chunks_exact(4) {
        let [y0, u, y1, v] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        push_rgb(&mut rgb, y0, u, v);
        push_rgb(&mut rgb, y1, u, v);
    }
    Ok(rgb)
}

fn push_rgb(out: &mut Vec<u8>, y: u8, u: u8, v: u8) {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;
    let clamp = |x: i32| x.clamp(0, 255) as u8;
    out.push(clamp((298 * c + 409 * e + 128) >> 8));
    out.push(clamp((298 * c - 100 * d - 208 * e + 128) >> 8));
    out.push(clamp((298 * c + 516 * d + 128) >> 8));
}

/// Check if an RGB frame is dark using per-pixel channel means.
///
/// Returns true if more than `threshold_pct` of pixels have a mean
/// channel value below 32. Dark frames are not worth a backend call.
pub fn is_dark_frame(rgb: &[u8], threshold_pct: f32) -> bool {
    if rgb.len() < 3 {
        return true;
    }
    let pixels = rgb.len() / 3;
    let dark_count = rgb
        .chunks_exact(3)
        .filter(|px| (px[0] as u32 + px[1] as u32 + px[2] as u32) / 3 < 32)
        .count();
    (dark_count as f32 / pixels as f32) > threshold_pct
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from_rgb(data: Vec<u8>, width: u32, height: u32) -> Frame {
        Frame {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence: 0,
            is_dark: false,
        }
    }

    #[test]
    fn test_yuyv_to_rgb_gray_midpoint() {
        // Y=128, U=V=128 is neutral gray: R=G=B.
        let yuyv = vec![128, 128, 128, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb.len(), 6);
        assert_eq!(rgb[0], rgb[1]);
        assert_eq!(rgb[1], rgb[2]);
        assert_eq!(&rgb[0..3], &rgb[3..6]);
    }

    #[test]
    fn test_yuyv_to_rgb_black_and_white() {
        // Y=16 is black, Y=235 is white in BT.601.
        let yuyv = vec![16, 128, 235, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(&rgb[0..3], &[0, 0, 0]);
        assert_eq!(&rgb[3..6], &[255, 255, 255]);
    }

    #[test]
    fn test_yuyv_invalid_length() {
        let yuyv = vec![100, 128]; // too short for 2x1
        assert!(yuyv_to_rgb(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn test_dark_frame_all_black() {
        let rgb = vec![0u8; 3000];
        assert!(is_dark_frame(&rgb, 0.95));
    }

    #[test]
    fn test_dark_frame_normal() {
        let rgb = vec![128u8; 3000];
        assert!(!is_dark_frame(&rgb, 0.95));
    }

    #[test]
    fn test_dark_frame_empty() {
        assert!(is_dark_frame(&[], 0.95));
    }

    #[test]
    fn test_dark_frame_mostly_dark() {
        // 96% dark, 4% bright
        let mut rgb = vec![10u8; 960 * 3];
        rgb.extend(vec![128u8; 40 * 3]);
        assert!(is_dark_frame(&rgb, 0.95));
    }

    #[test]
    fn test_to_jpeg_round_trips_dimensions() {
        let frame = frame_from_rgb(vec![90u8; 8 * 4 * 3], 8, 4);
        let jpeg = frame.to_jpeg(85).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_avg_brightness() {
        let frame = frame_from_rgb(vec![100u8; 30], 5, 2);
        assert!((frame.avg_brightness() - 100.0).abs() < 1e-6);
    }
}
