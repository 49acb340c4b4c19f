// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::metadata;
use crate::photo::model::{year_month, ScannedLivePhoto};
use crate::photo::motion::MotionClipExtractor;
use crate::photo::repo::{ClipToAdd, Repository};
use crate::photo::scanner::Scanner;
use crate::video;
use anyhow::*;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::result::Result::Ok;
use tracing::{debug, warn};

/// Copies Live Photos from a source directory into the library and
/// records them in the repository.
///
/// Imported files land in `<library>/<year>/<month>/`, keyed on the
/// photo's creation timestamp, EXIF first and file system second.
#[derive(Debug, Clone)]
pub struct Importer {
    /// Base path of the photo library.
    library_base_path: PathBuf,

    repo: Repository,

    extractor: MotionClipExtractor,
}

impl Importer {
    pub fn build(library_base_path: &Path, repo: Repository) -> Result<Importer> {
        fs::create_dir_all(library_base_path)?;
        Ok(Importer {
            library_base_path: PathBuf::from(library_base_path),
            repo,
            extractor: MotionClipExtractor::new(),
        })
    }

    /// Imports everything the scanner finds under `source`.
    /// `progress` is called after each candidate with (done, total).
    /// Returns the number of photos newly added to the library.
    pub fn import<F>(&mut self, source: &Path, mut progress: F) -> Result<usize>
    where
        F: FnMut(usize, usize),
    {
        let scanner = Scanner::build(source)?;
        let candidates = scanner.scan_all()?;
        let total = candidates.len();

        let mut imported = 0;
        for (i, candidate) in candidates.iter().enumerate() {
            match self.import_one(candidate) {
                Ok(is_new) => {
                    if is_new {
                        imported += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to import {:?}: {:?}", candidate.image_path, e);
                }
            }
            progress(i + 1, total);
        }

        Ok(imported)
    }

    /// Imports a single candidate. Returns whether the photo was new
    /// to the library.
    fn import_one(&mut self, candidate: &ScannedLivePhoto) -> Result<bool> {
        let exif = metadata::Metadata::from_path(&candidate.image_path).unwrap_or_default();
        let exif_created_at: Option<DateTime<Utc>> = exif.created_at.map(|x| x.to_utc());

        let taken_at = exif_created_at.unwrap_or(candidate.fs_created_at);
        let dest_dir = self.library_base_path.join(year_month(taken_at).folder_path());
        fs::create_dir_all(&dest_dir)?;

        let dest_image = dest_dir.join(
            candidate
                .image_path
                .file_name()
                .ok_or_else(|| anyhow!("no file name for {:?}", candidate.image_path))?,
        );
        copy_into_library(&candidate.image_path, &dest_image)?;

        let clip_path = match candidate.video_path {
            Some(ref video_path) => {
                let dest_video = dest_dir.join(
                    video_path
                        .file_name()
                        .ok_or_else(|| anyhow!("no file name for {:?}", video_path))?,
                );
                copy_into_library(video_path, &dest_video)?;
                Some((dest_video, false))
            }
            None => self
                .extractor
                .extract(&dest_image)?
                .map(|extracted| (extracted, true)),
        };

        let clip = clip_path.map(|(video_path, is_embedded)| {
            // Duration and codec are best effort. A clip that can't be
            // probed still belongs in the library.
            let probed = video::metadata::from_path(&video_path)
                .map_err(|e| {
                    debug!("Could not probe clip {:?}: {:?}", video_path, e);
                    e
                })
                .unwrap_or_default();

            ClipToAdd {
                video_path,
                duration: probed.duration,
                video_codec: probed.video_codec,
                is_embedded,
            }
        });

        let (_, is_new) = self.repo.add_live_photo(
            &dest_image,
            candidate.fs_created_at,
            exif_created_at,
            clip.as_ref(),
        )?;

        Ok(is_new)
    }
}

fn copy_into_library(src: &Path, dest: &Path) -> Result<()> {
    // Re-importing from inside the library would truncate the file.
    if src == dest {
        return Ok(());
    }
    fs::copy(src, dest)?;
    Ok(())
}
