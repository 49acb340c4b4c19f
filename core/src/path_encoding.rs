// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

/// Operations for encoding paths to and from base64 strings.
/// Paths are not strings, so should not be saved to a TEXT column in the
/// sqlite database. The TEXT data type can be UTF8 or UTF16, which paths
/// are _not_, so library-relative paths are encoded as base64 before they
/// are written to the database.
///
/// On unix the encoded bytes are the native path bytes; on Windows they
/// are the path's UTF-16LE code units. A database is therefore tied to
/// the platform family that wrote it.
///
/// Each base64 column has a '*_lossy' sibling holding the same path with
/// invalid characters removed. The lossy sibling exists for debugging and
/// for substring search, where a lossy match is acceptable.
use anyhow::*;
use base64::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Encode a path as a base 64 string.
#[cfg(unix)]
pub fn to_base64(p: &Path) -> String {
    use std::os::unix::ffi::OsStrExt;

    BASE64_STANDARD.encode(p.as_os_str().as_bytes())
}

#[cfg(unix)]
pub fn from_base64(s: &str) -> Result<PathBuf> {
    use std::os::unix::ffi::OsStringExt;

    Ok(BASE64_STANDARD
        .decode(s)
        .map(OsString::from_vec)
        .map(PathBuf::from)?)
}

/// Encode a path as a base 64 string.
#[cfg(windows)]
pub fn to_base64(p: &Path) -> String {
    use std::os::windows::ffi::OsStrExt;

    let mut bytes = Vec::with_capacity(p.as_os_str().len() * 2);
    for unit in p.as_os_str().encode_wide() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    BASE64_STANDARD.encode(bytes)
}

#[cfg(windows)]
pub fn from_base64(s: &str) -> Result<PathBuf> {
    use std::os::windows::ffi::OsStringExt;

    let bytes = BASE64_STANDARD.decode(s)?;
    ensure!(bytes.len() % 2 == 0, "odd UTF-16 byte length");

    let wide: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(PathBuf::from(OsString::from_wide(&wide)))
}
