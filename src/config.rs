// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::*;
use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::PathBuf;
use std::result::Result::Ok;

/// Where everything lives on disk.
///
/// By default the library, database, and cache sit under the platform
/// data directory for "LiveVault" (`%APPDATA%\LiveVault` on Windows),
/// and exports land in `<Documents>/LiveVault/Export`. Both roots can
/// be overridden from the command line.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root of the year/month photo library.
    pub library_dir: PathBuf,

    pub database_path: PathBuf,

    /// Thumbnails and other derived files.
    pub cache_dir: PathBuf,

    pub export_dir: PathBuf,
}

impl Paths {
    pub fn resolve(data_dir: Option<PathBuf>, export_dir: Option<PathBuf>) -> Result<Paths> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "LiveVault")
                .context("no home directory for this user")?
                .data_dir()
                .to_path_buf(),
        };

        let export_dir = match export_dir {
            Some(dir) => dir,
            None => {
                let user_dirs = UserDirs::new().context("no home directory for this user")?;
                let documents = user_dirs
                    .document_dir()
                    .map(|d| d.to_path_buf())
                    .unwrap_or_else(|| user_dirs.home_dir().join("Documents"));
                documents.join("LiveVault").join("Export")
            }
        };

        Ok(Paths {
            library_dir: data_dir.join("library"),
            database_path: data_dir.join("library.db"),
            cache_dir: data_dir.join("cache"),
            export_dir,
        })
    }

    /// Creates the library and cache directories if absent.
    /// The export directory is created by the exporter on demand.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.library_dir)?;
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}
