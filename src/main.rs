// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

mod config;

use anyhow::*;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use livevault_core::database;
use livevault_core::photo::LivePhoto;
use livevault_core::Exporter;
use livevault_core::Importer;
use livevault_core::Library;
use livevault_core::PhotoId;
use livevault_core::Previewer;
use livevault_core::Repository;
use livevault_core::SearchFilter;
use livevault_core::Thumbnailer;
use std::path::PathBuf;
use std::result::Result::Ok;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "livevault")]
#[command(version)]
#[command(about = "Manage iPhone Live Photos: import, organize, preview, export")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the data directory holding library, database, and cache
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Override the export directory
    #[arg(long, global = true, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import Live Photos from a source directory into the library
    Import {
        /// Directory to scan for HEIC/MOV files
        source: PathBuf,
    },

    /// List everything in the library, newest first
    List,

    /// Search the library by file name and date range
    Search {
        /// File name substring
        #[arg(short, long)]
        query: Option<String>,

        /// Earliest date to include, e.g. 2024-03-01
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date to include
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Export photos (image and clip) to the export directory
    Export {
        /// Photo IDs to export
        #[arg(required_unless_present = "clear")]
        ids: Vec<i64>,

        /// Empty the export directory first
        #[arg(long)]
        clear: bool,
    },

    /// Show library statistics
    Stats,

    /// Delete photos from the library
    Remove {
        /// Photo IDs to delete
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Generate missing thumbnails
    Thumbnails,

    /// Render a preview image for one photo
    Preview {
        /// Photo ID
        id: i64,

        /// Where to write the preview PNG
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 160)]
        width: u32,

        #[arg(long, default_value_t = 160)]
        height: u32,

        /// Render the first frame of the clip instead of the still
        #[arg(long)]
        frame: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Enable logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = config::Paths::resolve(cli.data_dir, cli.export_dir)?;
    paths.ensure()?;
    tracing::debug!("Library at {:?}, database at {:?}", paths.library_dir, paths.database_path);

    let con = database::setup(&paths.database_path)?;
    let con = Arc::new(Mutex::new(con));
    let repo = Repository::open(&paths.library_dir, &paths.cache_dir, con)?;

    match cli.command {
        Commands::Import { source } => {
            let mut importer = Importer::build(&paths.library_dir, repo)?;

            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} imported")
                    .expect("valid template"),
            );

            let imported = importer.import(&source, |done, total| {
                bar.set_length(total as u64);
                bar.set_position(done as u64);
            })?;
            bar.finish_and_clear();

            println!("Imported {} new photos into {:?}", imported, paths.library_dir);
        }

        Commands::List => {
            let mut library = Library::new(repo);
            library.refresh()?;
            let all = library.all();
            print_photos(all.iter().map(|p| p.as_ref()));
        }

        Commands::Search { query, from, to } => {
            let filter = SearchFilter {
                file_name: query,
                from,
                to,
            };
            let found = repo.search(&filter)?;
            print_photos(found.iter());
        }

        Commands::Export { ids, clear } => {
            let exporter = Exporter::build(repo, &paths.export_dir)?;
            if clear {
                exporter.clear()?;
            }

            let ids: Vec<PhotoId> = ids.into_iter().map(PhotoId::new).collect();
            let exported = exporter.export(&ids)?;
            println!("Exported {} photos to {:?}", exported, exporter.export_dir());
        }

        Commands::Stats => {
            let library = Library::new(repo);
            let stats = library.stats()?;
            println!("Photos:      {}", stats.total_photos);
            println!("Live photos: {}", stats.live_photos);
            println!("On disk:     {}", format_size(stats.total_size_bytes, DECIMAL));
        }

        Commands::Remove { ids } => {
            let mut library = Library::new(repo);
            for id in ids {
                library.remove(PhotoId::new(id))?;
            }
        }

        Commands::Thumbnails => {
            let mut repo = repo;
            let thumbnailer = Thumbnailer::build(&paths.cache_dir)?;
            let generated = thumbnailer.generate_missing(&mut repo)?;
            println!("Generated {} thumbnails", generated);
        }

        Commands::Preview {
            id,
            output,
            width,
            height,
            frame,
        } => {
            let photo = repo
                .get(PhotoId::new(id))?
                .with_context(|| format!("no photo with id {}", id))?;

            let previewer = Previewer::new();
            let preview = if frame {
                previewer.clip_frame(&photo, width, height)?
            } else {
                previewer.still(&photo, width, height)?
            };

            preview.save(&output)?;
            println!("Wrote preview to {:?}", output);
        }
    }

    Ok(())
}

fn print_photos<'a>(photos: impl Iterator<Item = &'a LivePhoto>) {
    let mut count = 0;
    for photo in photos {
        let duration = photo
            .clip
            .as_ref()
            .and_then(|clip| clip.duration)
            .map(|d| format!("{:.1}s", d.num_milliseconds() as f64 / 1000.0))
            .unwrap_or_else(|| "-".to_string());

        let live = if photo.is_live() { "LIVE" } else { "    " };

        println!(
            "{:>6}  {}  {}  {}  {}",
            photo.photo_id.id(),
            photo.created_at().format("%Y-%m-%d %H:%M"),
            live,
            duration,
            photo.file_name(),
        );
        count += 1;
    }
    println!("{} photos", count);
}
