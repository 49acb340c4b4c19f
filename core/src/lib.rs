// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod database;
pub mod exporter;
pub mod file_types;
pub mod importer;
pub mod library;
pub mod path_encoding;
pub mod photo;
pub mod preview;
pub mod time;
pub mod video;

pub use exporter::Exporter;
pub use importer::Importer;
pub use library::Library;
pub use library::Stats;
pub use photo::PhotoId;
pub use photo::Repository;
pub use photo::Scanner;
pub use photo::SearchFilter;
pub use photo::Thumbnailer;
pub use preview::Previewer;
pub use time::Year;
pub use time::YearMonth;
