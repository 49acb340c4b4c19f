// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::model::{LivePhoto, PhotoId};
use crate::photo::repo::Repository;
use anyhow::*;
use image::DynamicImage;
use image::ImageReader;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::result::Result::Ok;
use tracing::{error, info};

const EDGE: u32 = 200;

/// Decodes an image file, going through ffmpeg for formats that
/// image-rs can't read itself (HEIC stills, video clips).
pub(crate) fn decode(path: &Path) -> Result<DynamicImage> {
    let guessed = ImageReader::open(path)?.with_guessed_format()?;
    if guessed.format().is_some() {
        return Ok(guessed.decode()?);
    }
    decode_via_ffmpeg(path)
}

/// Extracts the first frame of a file as a PNG via ffmpeg and decodes it.
pub(crate) fn decode_via_ffmpeg(path: &Path) -> Result<DynamicImage> {
    let temporary_png_file = tempfile::Builder::new().suffix(".png").tempfile()?;

    let status = Command::new("ffmpeg")
        .arg("-loglevel")
        .arg("error")
        .arg("-y") // temp file will already exist, so allow overwriting
        .arg("-i")
        .arg(path.as_os_str())
        .arg("-update")
        .arg("true")
        .arg("-vf")
        .arg(r"select=eq(n\,0)") // select frame zero
        .arg(temporary_png_file.path())
        .status()?;

    if !status.success() {
        bail!("ffmpeg failed to decode {:?}", path);
    }

    Ok(ImageReader::open(temporary_png_file.path())?.decode()?)
}

/// Thumbnail operations for photos.
#[derive(Debug, Clone)]
pub struct Thumbnailer {
    base_path: PathBuf,
}

impl Thumbnailer {
    pub fn build(cache_base_path: &Path) -> Result<Thumbnailer> {
        let base_path = PathBuf::from(cache_base_path).join("thumbnails");
        std::fs::create_dir_all(&base_path)?;
        Ok(Thumbnailer { base_path })
    }

    /// Computes a square thumbnail for a photo that has been inserted
    /// into the repository. Thumbnail is written to the file system and
    /// its path returned.
    pub fn thumbnail(&self, photo_id: &PhotoId, path: &Path) -> Result<PathBuf> {
        let thumbnail_path = {
            let file_name = format!("{}_{}x{}.png", photo_id, EDGE, EDGE);
            self.base_path.join(file_name)
        };

        if thumbnail_path.exists() {
            return Ok(thumbnail_path);
        }

        let thumbnail = standard_thumbnail(path)?;

        thumbnail.save(&thumbnail_path).or_else(|e| {
            let _ = std::fs::remove_file(&thumbnail_path);
            Err(e) // don't lose original error
        })?;

        Ok(thumbnail_path)
    }

    /// Generates thumbnails for every photo that lacks one, recording
    /// each result. Photos that can't be decoded are marked broken.
    /// Returns the number of thumbnails generated.
    pub fn generate_missing(&self, repo: &mut Repository) -> Result<usize> {
        let photos: Vec<LivePhoto> = repo.find_need_thumbnail()?;
        info!("{} photos need a thumbnail", photos.len());

        let outcomes: Vec<(PhotoId, Result<PathBuf>)> = photos
            .par_iter()
            .map(|photo| (photo.photo_id, self.thumbnail(&photo.photo_id, &photo.path)))
            .collect();

        let mut generated = 0;
        for (photo_id, outcome) in outcomes {
            match outcome {
                Ok(thumbnail_path) => {
                    repo.add_thumbnail(&photo_id, &thumbnail_path)?;
                    generated += 1;
                }
                Err(e) => {
                    error!("Failed to thumbnail photo {}: {:?}", photo_id, e);
                    repo.mark_broken(&photo_id)?;
                }
            }
        }

        Ok(generated)
    }
}

fn standard_thumbnail(path: &Path) -> Result<DynamicImage> {
    let img = decode(path)?;

    let img = if img.width() == img.height() && img.width() == EDGE {
        return Ok(img);
    } else if img.width() == img.height() {
        img
    } else if img.width() < img.height() {
        let h = (img.height() - img.width()) / 2;
        img.crop_imm(0, h, img.width(), img.width())
    } else {
        let w = (img.width() - img.height()) / 2;
        img.crop_imm(w, 0, img.height(), img.height())
    };

    let img = img.thumbnail(EDGE, EDGE);
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use chrono::Utc;
    use image::RgbImage;
    use std::sync::{Arc, Mutex};

    #[test]
    fn thumbnail_is_square() {
        let dir = tempfile::tempdir().unwrap();
        let photo_path = dir.path().join("IMG_0001.png");
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        img.save(&photo_path).unwrap();

        let thumbnailer = Thumbnailer::build(dir.path()).unwrap();
        let thumb_path = thumbnailer
            .thumbnail(&PhotoId::new(1), &photo_path)
            .unwrap();

        let thumb = ImageReader::open(&thumb_path).unwrap().decode().unwrap();
        assert_eq!(thumb.width(), thumb.height());
        assert!(thumb.width() <= EDGE);
    }

    #[test]
    fn undecodable_photo_is_marked_broken() {
        let library_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();

        let month_dir = library_dir.path().join("2024/03");
        std::fs::create_dir_all(&month_dir).unwrap();
        let photo_path = month_dir.join("IMG_0001.HEIC");
        std::fs::write(&photo_path, b"not an image at all").unwrap();

        let con = Arc::new(Mutex::new(database::setup_in_memory().unwrap()));
        let mut repo = Repository::open(library_dir.path(), cache_dir.path(), con).unwrap();
        repo.add_live_photo(&photo_path, Utc::now(), None, None)
            .unwrap();

        let thumbnailer = Thumbnailer::build(cache_dir.path()).unwrap();
        let generated = thumbnailer.generate_missing(&mut repo).unwrap();

        assert_eq!(0, generated);
        // The broken photo drops out of the index and of future batches.
        assert!(repo.all().unwrap().is_empty());
        assert!(repo.find_need_thumbnail().unwrap().is_empty());
    }
}
