// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::photo::model::{LivePhoto, PhotoId};
use crate::photo::repo::{Repository, SearchFilter};
use anyhow::*;
use std::fs;
use std::path::Path;
use std::result::Result::Ok;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Library statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_photos: u64,

    /// Photos with a video clip.
    pub live_photos: u64,

    /// Bytes on disk for stills and clips together.
    pub total_size_bytes: u64,
}

/// Index of all Live Photos in the library.
#[derive(Clone)]
pub struct Library {
    repo: Repository,

    index: Arc<RwLock<Vec<Arc<LivePhoto>>>>,
}

impl Library {
    pub fn new(repo: Repository) -> Library {
        Library {
            repo,
            index: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Reload all library items from the database.
    pub fn refresh(&mut self) -> Result<()> {
        let all = self.repo.all()?;

        let mut index = self.index.write().unwrap();
        index.clear();
        for item in all {
            index.push(Arc::new(item));
        }

        Ok(())
    }

    /// Gets a shared copy of the library index.
    pub fn all(&self) -> Vec<Arc<LivePhoto>> {
        let index = self.index.read().unwrap();
        index.clone()
    }

    pub fn get(&self, photo_id: PhotoId) -> Result<Option<LivePhoto>> {
        self.repo.get(photo_id)
    }

    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<LivePhoto>> {
        self.repo.search(filter)
    }

    /// Deletes a photo: still, clip, thumbnail, and index row.
    /// A file already gone does not abort the deletion.
    pub fn remove(&mut self, photo_id: PhotoId) -> Result<()> {
        let Some(photo) = self.repo.get(photo_id)? else {
            bail!("no photo with id {}", photo_id);
        };

        remove_file_if_present(&photo.path);
        if let Some(clip) = &photo.clip {
            remove_file_if_present(&clip.video_path);
        }
        if let Some(thumbnail_path) = &photo.thumbnail_path {
            remove_file_if_present(thumbnail_path);
        }

        self.repo.remove(photo_id)?;
        info!("Removed photo {} from library", photo_id);
        Ok(())
    }

    /// Computes library statistics over the photos `all()` reports,
    /// so counts and sizes describe the same population. Sizes come
    /// from the files on disk; a missing file contributes zero bytes.
    pub fn stats(&self) -> Result<Stats> {
        let mut total_size_bytes = 0;
        for photo in self.repo.all()? {
            total_size_bytes += file_size(&photo.path);
            if let Some(clip) = &photo.clip {
                total_size_bytes += file_size(&clip.video_path);
            }
        }

        Ok(Stats {
            total_photos: self.repo.count_photos()?,
            live_photos: self.repo.count_live_photos()?,
            total_size_bytes,
        })
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn remove_file_if_present(path: &Path) {
    if path.is_file() {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::photo::repo::ClipToAdd;
    use chrono::Utc;
    use std::sync::Mutex;

    fn live_photo_on_disk(library_dir: &Path, repo: &mut Repository, name: &str) -> PhotoId {
        let month_dir = library_dir.join("2024/03");
        fs::create_dir_all(&month_dir).unwrap();
        let image = month_dir.join(name);
        let video = image.with_extension("MOV");
        fs::write(&image, b"still bytes").unwrap();
        fs::write(&video, b"clip bytes!").unwrap();

        let (id, _) = repo
            .add_live_photo(
                &image,
                Utc::now(),
                None,
                Some(&ClipToAdd {
                    video_path: video,
                    duration: None,
                    video_codec: None,
                    is_embedded: false,
                }),
            )
            .unwrap();
        id
    }

    #[test]
    fn stats_count_bytes_on_disk() {
        let library_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let con = Arc::new(Mutex::new(database::setup_in_memory().unwrap()));
        let mut repo = Repository::open(library_dir.path(), cache_dir.path(), con).unwrap();

        live_photo_on_disk(library_dir.path(), &mut repo, "IMG_0001.HEIC");

        let library = Library::new(repo);
        let stats = library.stats().unwrap();

        assert_eq!(1, stats.total_photos);
        assert_eq!(1, stats.live_photos);
        assert_eq!(22, stats.total_size_bytes); // 11 bytes still + 11 bytes clip
    }

    #[test]
    fn stats_skip_broken_photos_entirely() {
        let library_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let con = Arc::new(Mutex::new(database::setup_in_memory().unwrap()));
        let mut repo = Repository::open(library_dir.path(), cache_dir.path(), con).unwrap();

        live_photo_on_disk(library_dir.path(), &mut repo, "IMG_0001.HEIC");
        let broken = live_photo_on_disk(library_dir.path(), &mut repo, "IMG_0002.HEIC");
        repo.mark_broken(&broken).unwrap();

        let library = Library::new(repo);
        let stats = library.stats().unwrap();

        // One healthy photo: 11 bytes still + 11 bytes clip.
        assert_eq!(1, stats.total_photos);
        assert_eq!(1, stats.live_photos);
        assert_eq!(22, stats.total_size_bytes);
    }

    #[test]
    fn remove_deletes_files_and_row() {
        let library_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let con = Arc::new(Mutex::new(database::setup_in_memory().unwrap()));
        let mut repo = Repository::open(library_dir.path(), cache_dir.path(), con).unwrap();

        let id = live_photo_on_disk(library_dir.path(), &mut repo, "IMG_0002.HEIC");

        let mut library = Library::new(repo);
        library.remove(id).unwrap();

        let month_dir = library_dir.path().join("2024/03");
        assert!(!month_dir.join("IMG_0002.HEIC").exists());
        assert!(!month_dir.join("IMG_0002.MOV").exists());
        assert!(library.get(id).unwrap().is_none());

        library.refresh().unwrap();
        assert!(library.all().is_empty());
    }
}
