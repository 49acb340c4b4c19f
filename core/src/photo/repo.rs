// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::path_encoding;
use crate::photo::model::{LiveClip, LivePhoto, PhotoId};
use anyhow::*;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rusqlite;
use rusqlite::params;
use rusqlite::types::ToSql;
use rusqlite::Row;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const LIVE_PHOTO_SELECT: &str = "SELECT
        photos.photo_id,
        photos.photo_path_b64,
        photos.thumbnail_path,
        photos.fs_created_ts,
        photos.exif_created_ts,
        live_clips.video_path_b64,
        live_clips.duration_millis,
        live_clips.video_codec,
        live_clips.is_embedded
    FROM photos
    LEFT JOIN live_clips USING (photo_id)";

/// The video clip facts recorded alongside a newly imported photo.
#[derive(Debug, Clone)]
pub struct ClipToAdd {
    /// Full path to the clip file in the library.
    pub video_path: PathBuf,
    pub duration: Option<TimeDelta>,
    pub video_codec: Option<String>,
    pub is_embedded: bool,
}

/// Search terms for the library index. An empty filter matches everything.
#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    /// Case-insensitive file name substring.
    pub file_name: Option<String>,

    /// Inclusive start of the date range.
    pub from: Option<NaiveDate>,

    /// Inclusive end of the date range.
    pub to: Option<NaiveDate>,
}

/// Repository of Live Photo metadata.
/// Repository is backed by a Sqlite database.
#[derive(Debug, Clone)]
pub struct Repository {
    /// Base path to photo library on file system.
    library_base_path: PathBuf,

    /// Base path for thumbnails.
    cache_dir_base_path: PathBuf,

    /// Connection to backing Sqlite database.
    con: Arc<Mutex<rusqlite::Connection>>,
}

impl Repository {
    pub fn open(
        library_base_path: &Path,
        cache_dir_base_path: &Path,
        con: Arc<Mutex<rusqlite::Connection>>,
    ) -> Result<Repository> {
        if !library_base_path.is_dir() {
            bail!("{:?} is not a directory", library_base_path);
        }

        let repo = Repository {
            library_base_path: PathBuf::from(library_base_path),
            cache_dir_base_path: PathBuf::from(cache_dir_base_path),
            con,
        };

        Ok(repo)
    }

    pub fn library_base_path(&self) -> &Path {
        &self.library_base_path
    }

    /// Records an imported photo and, when present, its clip.
    /// Re-adding a photo at a path already in the library updates the
    /// existing row. Returns the photo's ID and whether it was new.
    pub fn add_live_photo(
        &mut self,
        photo_path: &Path,
        fs_created_at: DateTime<Utc>,
        exif_created_at: Option<DateTime<Utc>>,
        clip: Option<&ClipToAdd>,
    ) -> Result<(PhotoId, bool)> {
        let mut con = self.con.lock().unwrap();
        let tx = con.transaction()?;

        let (photo_id, is_new) = {
            // convert to relative path before saving to database
            let photo_path = photo_path.strip_prefix(&self.library_base_path)?;
            let photo_path_b64 = path_encoding::to_base64(photo_path);

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT photo_id FROM photos WHERE photo_path_b64 = ?1",
                    [&photo_path_b64],
                    |row| row.get(0),
                )
                .ok();

            let file_name = photo_path
                .file_name()
                .map(|x| x.to_string_lossy().to_string())
                .ok_or_else(|| anyhow!("no file name for {:?}", photo_path))?;

            let mut insert_stmt = tx.prepare_cached(
                "INSERT INTO photos (
                    photo_path_b64,
                    photo_path_lossy,
                    file_name,
                    fs_created_ts,
                    exif_created_ts
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5
                ) ON CONFLICT (photo_path_b64) DO UPDATE SET
                    fs_created_ts = ?4,
                    exif_created_ts = ?5
                ",
            )?;

            insert_stmt.execute(params![
                photo_path_b64,
                photo_path.to_string_lossy(),
                file_name,
                fs_created_at,
                exif_created_at,
            ])?;

            let photo_id: i64 = match existing {
                Some(id) => id,
                None => tx.query_row(
                    "SELECT photo_id FROM photos WHERE photo_path_b64 = ?1",
                    [&photo_path_b64],
                    |row| row.get(0),
                )?,
            };

            if let Some(clip) = clip {
                let video_path = clip.video_path.strip_prefix(&self.library_base_path)?;

                let mut clip_stmt = tx.prepare_cached(
                    "INSERT INTO live_clips (
                        photo_id,
                        video_path_b64,
                        video_path_lossy,
                        duration_millis,
                        video_codec,
                        is_embedded
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5, ?6
                    ) ON CONFLICT (photo_id) DO UPDATE SET
                        video_path_b64 = ?2,
                        video_path_lossy = ?3,
                        duration_millis = ?4,
                        video_codec = ?5,
                        is_embedded = ?6
                    ",
                )?;

                clip_stmt.execute(params![
                    photo_id,
                    path_encoding::to_base64(video_path),
                    video_path.to_string_lossy(),
                    clip.duration.map(|x| x.num_milliseconds()),
                    clip.video_codec,
                    clip.is_embedded,
                ])?;
            }

            (PhotoId::new(photo_id), existing.is_none())
        };

        tx.commit()?;
        Ok((photo_id, is_new))
    }

    /// Gets all photos in the library, newest first.
    pub fn all(&self) -> Result<Vec<LivePhoto>> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(&format!(
            "{LIVE_PHOTO_SELECT}
            WHERE COALESCE(photos.is_broken, FALSE) IS FALSE
            ORDER BY COALESCE(exif_created_ts, fs_created_ts) DESC"
        ))?;

        let result = stmt
            .query_map([], |row| self.to_live_photo(row))?
            .flatten()
            .collect();

        Ok(result)
    }

    pub fn get(&self, photo_id: PhotoId) -> Result<Option<LivePhoto>> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(&format!(
            "{LIVE_PHOTO_SELECT}
            WHERE photos.photo_id = ?1"
        ))?;

        let result = stmt
            .query_map([photo_id.id()], |row| self.to_live_photo(row))?
            .flatten()
            .next();

        Ok(result)
    }

    /// Searches the library by file name substring and date range.
    /// All terms are bound parameters, never interpolated into the SQL.
    pub fn search(&self, filter: &SearchFilter) -> Result<Vec<LivePhoto>> {
        let mut clauses = vec![String::from("COALESCE(photos.is_broken, FALSE) IS FALSE")];
        let mut bindings: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref file_name) = filter.file_name {
            bindings.push(Box::new(format!("%{}%", file_name)));
            // Match the file name only, never the year/month folders,
            // so a date-like query doesn't match a whole month.
            clauses.push(format!("photos.file_name LIKE ?{}", bindings.len()));
        }

        if let Some(from) = filter.from {
            let start_of_day = from
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow!("invalid date {}", from))?
                .and_utc();
            bindings.push(Box::new(start_of_day));
            clauses.push(format!(
                "COALESCE(exif_created_ts, fs_created_ts) >= ?{}",
                bindings.len()
            ));
        }

        if let Some(to) = filter.to {
            // Inclusive end: everything strictly before the next day.
            let next_day = to
                .succ_opt()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .ok_or_else(|| anyhow!("invalid date {}", to))?
                .and_utc();
            bindings.push(Box::new(next_day));
            clauses.push(format!(
                "COALESCE(exif_created_ts, fs_created_ts) < ?{}",
                bindings.len()
            ));
        }

        let sql = format!(
            "{LIVE_PHOTO_SELECT}
            WHERE {}
            ORDER BY COALESCE(exif_created_ts, fs_created_ts) DESC",
            clauses.join(" AND ")
        );

        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(&sql)?;

        let result = stmt
            .query_map(rusqlite::params_from_iter(bindings), |row| {
                self.to_live_photo(row)
            })?
            .flatten()
            .collect();

        Ok(result)
    }

    /// Gets all photos without a thumbnail.
    pub fn find_need_thumbnail(&self) -> Result<Vec<LivePhoto>> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(&format!(
            "{LIVE_PHOTO_SELECT}
            WHERE photos.thumbnail_path IS NULL
            AND COALESCE(photos.is_broken, FALSE) IS FALSE
            ORDER BY COALESCE(exif_created_ts, fs_created_ts) DESC"
        ))?;

        let result = stmt
            .query_map([], |row| self.to_live_photo(row))?
            .flatten()
            .collect();

        Ok(result)
    }

    pub fn add_thumbnail(&mut self, photo_id: &PhotoId, thumbnail_path: &Path) -> Result<()> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(
            "UPDATE photos
            SET
                thumbnail_path = ?2,
                is_broken = FALSE
            WHERE photo_id = ?1",
        )?;

        // convert to relative path before saving to database
        let thumbnail_path = thumbnail_path.strip_prefix(&self.cache_dir_base_path).ok();

        stmt.execute(params![
            photo_id.id(),
            thumbnail_path.as_ref().map(|p| p.to_str()),
        ])?;

        Ok(())
    }

    pub fn mark_broken(&mut self, photo_id: &PhotoId) -> Result<()> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(
            "UPDATE photos
            SET is_broken = TRUE
            WHERE photo_id = ?1",
        )?;

        stmt.execute(params![photo_id.id()])?;

        Ok(())
    }

    pub fn update_clip_duration(&mut self, photo_id: &PhotoId, duration: TimeDelta) -> Result<()> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare(
            "UPDATE live_clips
            SET duration_millis = ?2
            WHERE photo_id = ?1",
        )?;

        stmt.execute(params![photo_id.id(), duration.num_milliseconds()])?;

        Ok(())
    }

    /// Removes a photo's index row. The clip row goes with it.
    /// Files on disk are the library's job, not the repository's.
    pub fn remove(&mut self, photo_id: PhotoId) -> Result<()> {
        let con = self.con.lock().unwrap();
        let mut stmt = con.prepare("DELETE FROM photos WHERE photo_id = ?1")?;

        stmt.execute([photo_id.id()])?;

        Ok(())
    }

    /// Counts photos, broken ones excluded, like `all()`.
    pub fn count_photos(&self) -> Result<u64> {
        let con = self.con.lock().unwrap();
        let count: u64 = con.query_row(
            "SELECT COUNT(*) FROM photos
            WHERE COALESCE(is_broken, FALSE) IS FALSE",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Counts photos with a clip, broken ones excluded, like `all()`.
    pub fn count_live_photos(&self) -> Result<u64> {
        let con = self.con.lock().unwrap();
        let count: u64 = con.query_row(
            "SELECT COUNT(*) FROM photos
            JOIN live_clips USING (photo_id)
            WHERE COALESCE(is_broken, FALSE) IS FALSE",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn to_live_photo(&self, row: &Row<'_>) -> rusqlite::Result<LivePhoto> {
        let photo_id = row.get("photo_id").map(PhotoId::new)?;

        let photo_path: String = row.get("photo_path_b64")?;
        let photo_path =
            path_encoding::from_base64(&photo_path).map_err(|_| rusqlite::Error::InvalidQuery)?;
        let photo_path = self.library_base_path.join(photo_path);

        let thumbnail_path = row
            .get("thumbnail_path")
            .map(|p: String| self.cache_dir_base_path.join(p))
            .ok();

        let fs_created_at = row.get("fs_created_ts")?;
        let exif_created_at = row.get("exif_created_ts").ok();

        let clip = row
            .get("video_path_b64")
            .ok()
            .and_then(|p: String| path_encoding::from_base64(&p).ok())
            .map(|video_path| LiveClip {
                video_path: self.library_base_path.join(video_path),
                duration: row
                    .get("duration_millis")
                    .ok()
                    .and_then(TimeDelta::try_milliseconds),
                video_codec: row.get("video_codec").ok(),
                is_embedded: row.get("is_embedded").unwrap_or(false),
            });

        std::result::Result::Ok(LivePhoto {
            photo_id,
            path: photo_path,
            thumbnail_path,
            fs_created_at,
            exif_created_at,
            clip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use chrono::TimeZone;

    fn new_repo(library_dir: &Path) -> Repository {
        let con = database::setup_in_memory().unwrap();
        let con = Arc::new(Mutex::new(con));
        Repository::open(library_dir, Path::new("/var/cache/livevault"), con).unwrap()
    }

    fn add_photo(
        repo: &mut Repository,
        library_dir: &Path,
        name: &str,
        taken_at: Option<DateTime<Utc>>,
        with_clip: bool,
    ) -> PhotoId {
        let photo_path = library_dir.join("2024/03").join(name);
        let clip = with_clip.then(|| ClipToAdd {
            video_path: photo_path.with_extension("MOV"),
            duration: Some(TimeDelta::try_milliseconds(2500).unwrap()),
            video_codec: Some("hevc".into()),
            is_embedded: false,
        });

        let (id, _) = repo
            .add_live_photo(&photo_path, Utc::now(), taken_at, clip.as_ref())
            .unwrap();
        id
    }

    #[test]
    fn add_then_get() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let id = add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, true);

        let photo = repo.get(id).unwrap().unwrap();
        assert!(photo.path.ends_with("2024/03/IMG_0001.HEIC"));
        assert!(photo.is_live());

        let clip = photo.clip.unwrap();
        assert!(clip.video_path.ends_with("2024/03/IMG_0001.MOV"));
        assert_eq!(Some(2500), clip.duration.map(|d| d.num_milliseconds()));
        assert!(!clip.is_embedded);
    }

    #[test]
    fn re_adding_same_path_does_not_duplicate() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let first = add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, false);
        let second = add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, false);

        assert_eq!(first, second);
        assert_eq!(1, repo.count_photos().unwrap());
    }

    #[test]
    fn all_is_newest_first() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let older = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 3, 9, 9, 30, 0).unwrap();
        add_photo(
            &mut repo,
            library_dir.path(),
            "IMG_0001.HEIC",
            Some(older),
            false,
        );
        add_photo(
            &mut repo,
            library_dir.path(),
            "IMG_0002.HEIC",
            Some(newer),
            true,
        );

        let all = repo.all().unwrap();
        assert_eq!(2, all.len());
        assert!(all[0].path.ends_with("IMG_0002.HEIC"));
        assert!(all[1].path.ends_with("IMG_0001.HEIC"));
    }

    #[test]
    fn search_by_file_name_and_date() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let spring = Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2023, 12, 24, 18, 0, 0).unwrap();
        add_photo(
            &mut repo,
            library_dir.path(),
            "IMG_0001.HEIC",
            Some(spring),
            false,
        );
        add_photo(
            &mut repo,
            library_dir.path(),
            "IMG_0042.HEIC",
            Some(winter),
            false,
        );

        let by_name = repo
            .search(&SearchFilter {
                file_name: Some("0042".into()),
                ..SearchFilter::default()
            })
            .unwrap();
        assert_eq!(1, by_name.len());
        assert!(by_name[0].path.ends_with("IMG_0042.HEIC"));

        let by_range = repo
            .search(&SearchFilter {
                from: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                to: Some(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()),
                ..SearchFilter::default()
            })
            .unwrap();
        assert_eq!(1, by_range.len());
        assert!(by_range[0].path.ends_with("IMG_0001.HEIC"));

        let empty_filter = repo.search(&SearchFilter::default()).unwrap();
        assert_eq!(2, empty_filter.len());
    }

    #[test]
    fn search_matches_file_name_not_folders() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        // Lives under 2024/03, so a "2024" query must not match it.
        add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, false);

        let by_year = repo
            .search(&SearchFilter {
                file_name: Some("2024".into()),
                ..SearchFilter::default()
            })
            .unwrap();
        assert!(by_year.is_empty());

        let by_name = repo
            .search(&SearchFilter {
                file_name: Some("IMG_0001".into()),
                ..SearchFilter::default()
            })
            .unwrap();
        assert_eq!(1, by_name.len());
    }

    #[test]
    fn remove_deletes_clip_row_too() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let id = add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, true);
        assert_eq!(1, repo.count_live_photos().unwrap());

        repo.remove(id).unwrap();

        assert!(repo.get(id).unwrap().is_none());
        assert_eq!(0, repo.count_photos().unwrap());
        assert_eq!(0, repo.count_live_photos().unwrap());
    }

    #[test]
    fn broken_photos_are_hidden() {
        let library_dir = tempfile::tempdir().unwrap();
        let mut repo = new_repo(library_dir.path());

        let id = add_photo(&mut repo, library_dir.path(), "IMG_0001.HEIC", None, false);
        repo.mark_broken(&id).unwrap();

        assert!(repo.all().unwrap().is_empty());
        assert!(repo.search(&SearchFilter::default()).unwrap().is_empty());
    }
}
