// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::Month;
use std::fmt::Display;
use std::path::PathBuf;

pub type Year = i32;

#[derive(Debug, PartialOrd, PartialEq)]
pub struct YearMonth {
    pub year: Year,
    pub month: Month,
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

impl YearMonth {
    pub fn new(year: Year, month: Month) -> YearMonth {
        YearMonth { year, month }
    }

    /// Library folder segment for this month, e.g. "2024/03".
    pub fn folder_path(&self) -> PathBuf {
        PathBuf::from(self.year.to_string())
            .join(format!("{:02}", self.month.number_from_month()))
    }
}
