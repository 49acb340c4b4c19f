// SPDX-FileCopyrightText: © 2026 LiveVault Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::*;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use std::path::Path;
use std::process::Command;

/// Stream metadata for a video clip, probed with ffprobe.
#[derive(Debug, Default, Clone)]
pub struct Metadata {
    pub created_at: Option<DateTime<Utc>>,

    pub width: Option<u64>,

    pub height: Option<u64>,

    pub duration: Option<TimeDelta>,

    pub container_format: Option<String>,

    pub video_codec: Option<String>,

    /// iOS id linking a clip with its still.
    pub content_id: Option<String>,
}

pub fn from_path(path: &Path) -> Result<Metadata> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-i")
        .arg(path.as_os_str())
        .arg("-print_format")
        .arg("json")
        .arg("-show_entries")
        .arg("format=duration,format_long_name:format_tags=com.apple.quicktime.content.identifier,com.apple.quicktime.creationdate:stream_tags=creation_time:stream=codec_name,codec_type,width,height")
        .output()
        .with_context(|| format!("ffprobe failed to launch for {:?}", path))?;

    if !output.status.success() {
        bail!("ffprobe failed for {:?}", path);
    }

    let v: Value = serde_json::from_slice(output.stdout.as_slice())?;

    let mut metadata = Metadata::default();

    metadata.duration = v["format"]["duration"] // seconds with decimal
        .as_str()
        .and_then(|x| {
            let fractional_secs = x.parse::<f64>();
            let millis = fractional_secs.map(|s| s * 1000.0).ok();
            millis.and_then(|m| TimeDelta::try_milliseconds(m as i64))
        });

    metadata.created_at = v["format"]["tags"]["com.apple.quicktime.creationdate"]
        .as_str()
        .and_then(|x| {
            let dt = DateTime::parse_from_rfc3339(x).ok();
            dt.map(|y| y.to_utc())
        });

    metadata.container_format = v["format"]["format_long_name"]
        .as_str()
        .map(|x| x.to_string());

    metadata.content_id = v["format"]["tags"]["com.apple.quicktime.content.identifier"]
        .as_str()
        .map(|x| x.to_string());

    let streams = v["streams"].as_array().cloned().unwrap_or_default();

    if let Some(video_stream) = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))
    {
        metadata.video_codec = video_stream["codec_name"].as_str().map(|x| x.to_string());
        metadata.width = video_stream["width"].as_u64();
        metadata.height = video_stream["height"].as_u64();

        let created_at = video_stream["tags"]["creation_time"].as_str().and_then(|x| {
            let dt = DateTime::parse_from_rfc3339(x).ok();
            dt.map(|y| y.to_utc())
        });

        metadata.created_at = metadata.created_at.or(created_at);
    }

    Ok(metadata)
}
