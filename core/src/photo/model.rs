// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::YearMonth;
use chrono::prelude::*;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt::Display;
use std::path::PathBuf;

/// Database ID of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoId(i64);

impl PhotoId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

impl Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The short video clip paired with a still image.
#[derive(Debug, Clone)]
pub struct LiveClip {
    /// Full path to the clip file.
    pub video_path: PathBuf,

    /// Duration of the clip, when it could be probed.
    pub duration: Option<TimeDelta>,

    pub video_codec: Option<String>,

    /// True when the clip was extracted from the still's own container
    /// rather than imported as a sibling file.
    pub is_embedded: bool,
}

/// A photo in the library.
#[derive(Debug, Clone)]
pub struct LivePhoto {
    /// Database primary key.
    pub photo_id: PhotoId,

    /// Full path to the still image in the library.
    pub path: PathBuf,

    /// Full path to square thumbnail image, once generated.
    pub thumbnail_path: Option<PathBuf>,

    /// Creation timestamp from the file system.
    pub fs_created_at: DateTime<Utc>,

    /// Creation timestamp from EXIF metadata.
    pub exif_created_at: Option<DateTime<Utc>>,

    /// The video clip, when the photo is live.
    pub clip: Option<LiveClip>,
}

impl LivePhoto {
    /// Best candidate for when the photo was taken.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.exif_created_at.unwrap_or(self.fs_created_at)
    }

    pub fn is_live(&self) -> bool {
        self.clip.is_some()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn year_month(&self) -> YearMonth {
        year_month(self.created_at())
    }

    pub fn date(&self) -> chrono::NaiveDate {
        self.created_at().date_naive()
    }
}

/// Year and month a timestamp falls in, for the library folder layout.
pub fn year_month(ts: DateTime<Utc>) -> YearMonth {
    let date = ts.date_naive();
    let month = u8::try_from(date.month()).expect("month in 1..=12");
    let month = chrono::Month::try_from(month).expect("month in 1..=12");
    YearMonth {
        year: date.year(),
        month,
    }
}

/// A Live Photo candidate found on the file system by the source scanner.
#[derive(Debug, Clone)]
pub struct ScannedLivePhoto {
    /// File name without the extension, e.g. "IMG_1234".
    pub stem: String,

    /// Full path to the still image in the source directory.
    pub image_path: PathBuf,

    /// Full path to the sibling video, when the pair was found.
    pub video_path: Option<PathBuf>,

    /// Newest of the still's file system creation and modification times.
    pub fs_created_at: DateTime<Utc>,

    pub fs_file_size_bytes: u64,
}

impl ScannedLivePhoto {
    pub fn is_paired(&self) -> bool {
        self.video_path.is_some()
    }
}
