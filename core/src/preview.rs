// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::model::LivePhoto;
use crate::photo::thumbnail;
use anyhow::*;
use image::imageops;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use std::result::Result::Ok;
use tracing::debug;

/// Renders previews of library items at an exact size: the image is
/// scaled to fit, centred on a black canvas, aspect ratio preserved.
/// Library files are decoded in place, never copied out first.
#[derive(Debug, Clone, Default)]
pub struct Previewer;

impl Previewer {
    pub fn new() -> Previewer {
        Previewer
    }

    /// Preview of the still image.
    pub fn still(&self, photo: &LivePhoto, width: u32, height: u32) -> Result<DynamicImage> {
        let img = thumbnail::decode(&photo.path)?;
        Ok(letterbox(&img, width, height))
    }

    /// First frame of the photo's clip, falling back to the still when
    /// there is no clip or the clip can't be decoded.
    pub fn clip_frame(&self, photo: &LivePhoto, width: u32, height: u32) -> Result<DynamicImage> {
        let Some(clip) = &photo.clip else {
            return self.still(photo, width, height);
        };

        match thumbnail::decode_via_ffmpeg(&clip.video_path) {
            Ok(frame) => Ok(letterbox(&frame, width, height)),
            Err(e) => {
                debug!("Falling back to still for {:?}: {:?}", clip.video_path, e);
                self.still(photo, width, height)
            }
        }
    }
}

/// Fits `img` onto a `width` x `height` black canvas, centred.
fn letterbox(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let scale_w = width as f64 / img.width() as f64;
    let scale_h = height as f64 / img.height() as f64;
    let scale = scale_w.min(scale_h);

    let new_w = ((img.width() as f64 * scale) as u32).max(1);
    let new_h = ((img.height() as f64 * scale) as u32).max(1);

    let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);

    // Black, fully opaque canvas.
    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));

    let x_offset = (width - new_w) / 2;
    let y_offset = (height - new_h) / 2;
    imageops::overlay(
        &mut canvas,
        &resized.to_rgba8(),
        x_offset as i64,
        y_offset as i64,
    );

    DynamicImage::ImageRgba8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::model::PhotoId;
    use chrono::Utc;
    use image::RgbImage;

    #[test]
    fn letterbox_preserves_aspect_ratio() {
        let wide = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            320,
            80,
            image::Rgb([255, 255, 255]),
        ));
        let boxed = letterbox(&wide, 160, 160);

        assert_eq!(160, boxed.width());
        assert_eq!(160, boxed.height());

        // The scaled image is 160x40 centred, so rows above and below are black.
        let rgba = boxed.to_rgba8();
        assert_eq!(image::Rgba([0, 0, 0, 255]), *rgba.get_pixel(80, 10));
        assert_eq!(image::Rgba([255, 255, 255, 255]), *rgba.get_pixel(80, 80));
    }

    #[test]
    fn still_preview_is_exact_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.png");
        DynamicImage::ImageRgb8(RgbImage::new(640, 480))
            .save(&path)
            .unwrap();

        let photo = LivePhoto {
            photo_id: PhotoId::new(1),
            path,
            thumbnail_path: None,
            fs_created_at: Utc::now(),
            exif_created_at: None,
            clip: None,
        };

        let preview = Previewer::new().still(&photo, 160, 160).unwrap();
        assert_eq!(160, preview.width());
        assert_eq!(160, preview.height());
    }
}
