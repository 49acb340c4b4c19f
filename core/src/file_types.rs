// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

// iPhones produce HEIC stills, but older devices and some export paths
// produce JPEGs, so accept both.
const LIVE_IMAGE_SUFFIXES: [&str; 4] = ["heic", "heif", "jpg", "jpeg"];

const LIVE_VIDEO_SUFFIXES: [&str; 3] = ["mov", "mp4", "m4v"];

pub fn is_live_image(path: &Path) -> bool {
    let Some(path_ext) = path.extension() else {
        return false;
    };

    LIVE_IMAGE_SUFFIXES
        .iter()
        .any(|ext| path_ext.eq_ignore_ascii_case(ext))
}

pub fn is_live_video(path: &Path) -> bool {
    let Some(path_ext) = path.extension() else {
        return false;
    };

    LIVE_VIDEO_SUFFIXES
        .iter()
        .any(|ext| path_ext.eq_ignore_ascii_case(ext))
}
