// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod metadata;
pub mod model;
pub mod motion;
pub mod repo;
pub mod scanner;
pub mod thumbnail;

pub use model::LiveClip;
pub use model::LivePhoto;
pub use model::PhotoId;
pub use model::ScannedLivePhoto;

pub use repo::Repository;
pub use repo::SearchFilter;
pub use scanner::Scanner;
pub use thumbnail::Thumbnailer;
