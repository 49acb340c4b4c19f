// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::file_types;
use crate::photo::model::ScannedLivePhoto;
use anyhow::*;
use chrono::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A still image and the sibling video it may be paired with.
#[derive(Debug, Default)]
struct FileGroup {
    image: Option<PathBuf>,
    video: Option<PathBuf>,
}

/// Scans a source directory for Live Photo candidates.
///
/// Live Photos arrive either as a sibling pair sharing a file stem,
/// such as IMG_1234.HEIC plus IMG_1234.MOV, or as a single still with
/// an embedded clip. The scanner groups files by stem; a lone video is
/// not a Live Photo and is dropped.
#[derive(Debug, Clone)]
pub struct Scanner {
    /// File system path to scan.
    scan_base: PathBuf,
}

impl Scanner {
    pub fn build(scan_base: &Path) -> Result<Self> {
        if !scan_base.is_dir() {
            bail!("{:?} is not a directory", scan_base);
        }
        let scan_base = PathBuf::from(scan_base);
        Ok(Self { scan_base })
    }

    /// Scans all Live Photo candidates in the base directory for function
    /// `func` to visit, in ascending stem order.
    pub fn scan_all_visit<F>(&self, mut func: F)
    where
        F: FnMut(ScannedLivePhoto),
    {
        let mut groups: BTreeMap<String, FileGroup> = BTreeMap::new();

        WalkDir::new(&self.scan_base)
            .into_iter()
            .flatten() // skip files we failed to read
            .filter(|x| x.path().is_file())
            .filter(|x| !x.file_name().to_string_lossy().starts_with('.'))
            .for_each(|entry| {
                let path = entry.path();
                let Some(stem) = path.file_stem().and_then(|x| x.to_str()) else {
                    return;
                };

                let group = groups.entry(stem.to_lowercase()).or_default();
                if file_types::is_live_image(path) {
                    group.image = Some(PathBuf::from(path));
                } else if file_types::is_live_video(path) {
                    group.video = Some(PathBuf::from(path));
                }
            });

        groups
            .into_values()
            .filter_map(|group| {
                let image_path = group.image?;
                self.scan_one_with_video(&image_path, group.video).ok()
            })
            .for_each(&mut func);
    }

    pub fn scan_all(&self) -> Result<Vec<ScannedLivePhoto>> {
        let mut candidates = Vec::new();
        self.scan_all_visit(|candidate| candidates.push(candidate));
        Ok(candidates)
    }

    /// Scans a single still image, pairing it with a sibling video
    /// sharing its stem if one exists.
    pub fn scan_one(&self, path: &Path) -> Result<ScannedLivePhoto> {
        let video_path = sibling_video(path);
        self.scan_one_with_video(path, video_path)
    }

    fn scan_one_with_video(
        &self,
        image_path: &Path,
        video_path: Option<PathBuf>,
    ) -> Result<ScannedLivePhoto> {
        let metadata = fs::File::open(image_path)?.metadata()?;

        let fs_modified_at: DateTime<Utc> = metadata.modified()?.into();

        // Windows-originated files often carry a copy time in the created
        // timestamp, so take the newest of the two, as the desktop app did.
        let fs_created_at = metadata
            .created()
            .map(|x| Into::<DateTime<Utc>>::into(x))
            .unwrap_or(fs_modified_at)
            .max(fs_modified_at);

        let stem = image_path
            .file_stem()
            .and_then(|x| x.to_str())
            .map(|x| x.to_string())
            .ok_or_else(|| anyhow!("no file stem for {:?}", image_path))?;

        Ok(ScannedLivePhoto {
            stem,
            image_path: PathBuf::from(image_path),
            video_path,
            fs_created_at,
            fs_file_size_bytes: metadata.len(),
        })
    }
}

/// Finds a video sibling of a still image, trying the extensions the
/// scanner accepts in both lower and upper case.
fn sibling_video(image_path: &Path) -> Option<PathBuf> {
    for ext in ["MOV", "mov", "MP4", "mp4", "M4V", "m4v"] {
        let candidate = image_path.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"not really media").unwrap();
        path
    }

    #[test]
    fn scan_pairs_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "IMG_0001.HEIC");
        touch(dir.path(), "IMG_0001.MOV");
        touch(dir.path(), "IMG_0002.HEIC");
        touch(dir.path(), "notes.txt");

        let scanner = Scanner::build(dir.path()).unwrap();
        let all = scanner.scan_all().unwrap();

        assert_eq!(2, all.len());
        assert_eq!("IMG_0001", all[0].stem);
        assert!(all[0].is_paired());
        assert_eq!("IMG_0002", all[1].stem);
        assert!(!all[1].is_paired());
    }

    #[test]
    fn scan_ignores_lone_videos_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "IMG_0003.MOV");
        touch(dir.path(), ".IMG_0004.HEIC");

        let scanner = Scanner::build(dir.path()).unwrap();
        let all = scanner.scan_all().unwrap();

        assert!(all.is_empty());
    }

    #[test]
    fn scan_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("DCIM").join("100APPLE");
        fs::create_dir_all(&sub).unwrap();
        touch(&sub, "IMG_0005.HEIC");
        touch(&sub, "IMG_0005.MOV");

        let scanner = Scanner::build(dir.path()).unwrap();
        let all = scanner.scan_all().unwrap();

        assert_eq!(1, all.len());
        assert!(all[0].image_path.ends_with("DCIM/100APPLE/IMG_0005.HEIC"));
    }

    #[test]
    fn scan_one_finds_sibling_video() {
        let dir = tempfile::tempdir().unwrap();
        let image = touch(dir.path(), "IMG_0006.HEIC");
        touch(dir.path(), "IMG_0006.MOV");

        let scanner = Scanner::build(dir.path()).unwrap();
        let one = scanner.scan_one(&image).unwrap();

        assert!(one.is_paired());
        assert!(one.fs_file_size_bytes > 0);
    }
}
