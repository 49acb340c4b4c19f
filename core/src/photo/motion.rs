// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::result::Result::Ok;
use tracing::debug;

use sm_motion_photo::SmMotion;

/// Pulls the embedded clip out of a still that arrived without a
/// sibling video. The clip lands next to the still as `<stem>.mp4`
/// so a photo and its clip always share a library folder.
#[derive(Debug, Clone, Default)]
pub struct MotionClipExtractor;

impl MotionClipExtractor {
    pub fn new() -> MotionClipExtractor {
        MotionClipExtractor
    }

    /// Extract the embedded clip if there is one.
    /// A still without an embedded clip is `Ok(None)`, not an error.
    pub fn extract(&self, photo_path: &Path) -> Result<Option<PathBuf>> {
        let photo_file = File::open(photo_path)?;
        let Some(sm) = SmMotion::with(&photo_file) else {
            return Ok(None);
        };

        if !sm.has_video() {
            return Ok(None);
        }

        debug!("Photo {:?} has an embedded clip.", photo_path);

        let clip_path = photo_path.with_extension("mp4");
        if clip_path.exists() {
            return Ok(Some(clip_path));
        }

        let mut clip_file = File::create(&clip_path)?;
        if sm.dump_video_file(&mut clip_file).is_err() {
            // don't leave a partial clip behind
            let _ = std::fs::remove_file(&clip_path);
            bail!("failed to extract embedded clip from {:?}", photo_path);
        }

        Ok(Some(clip_path))
    }
}
