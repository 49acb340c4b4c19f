// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::model::PhotoId;
use crate::photo::repo::Repository;
use anyhow::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::result::Result::Ok;
use tracing::warn;

/// Copies Live Photos out of the library, flat, for transfer back
/// to a device.
#[derive(Debug, Clone)]
pub struct Exporter {
    repo: Repository,

    export_path: PathBuf,
}

impl Exporter {
    pub fn build(repo: Repository, export_path: &Path) -> Result<Exporter> {
        fs::create_dir_all(export_path)?;
        Ok(Exporter {
            repo,
            export_path: PathBuf::from(export_path),
        })
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_path
    }

    /// Exports the selected photos, image and clip both.
    /// A photo whose files have gone missing is skipped with a warning.
    /// Returns the number of photos exported.
    pub fn export(&self, photo_ids: &[PhotoId]) -> Result<usize> {
        let mut exported = 0;

        for photo_id in photo_ids {
            let Some(photo) = self.repo.get(*photo_id)? else {
                warn!("No photo with id {} to export", photo_id);
                continue;
            };

            if !self.copy_out(&photo.path)? {
                continue;
            }

            if let Some(clip) = photo.clip {
                self.copy_out(&clip.video_path)?;
            }

            exported += 1;
        }

        Ok(exported)
    }

    /// Empties the export directory.
    pub fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.export_path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn copy_out(&self, src: &Path) -> Result<bool> {
        if !src.is_file() {
            warn!("{:?} is missing, skipping", src);
            return Ok(false);
        }

        let file_name = src
            .file_name()
            .ok_or_else(|| anyhow!("no file name for {:?}", src))?;

        fs::copy(src, self.export_path.join(file_name))?;
        Ok(true)
    }
}
