use serde::Serialize;

use crate::domain::platform::Platform;

pub const RECORDING_EXTENSIONS: [&str; 4] = ["ts", "mp4", "flv", "mkv"];
pub const UNKNOWN_STREAMER: &str = "Unknown";
pub const UNKNOWN_DURATION: &str = "--:--";

/// A media file produced by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub streamer_name: String,
    pub platform: Platform,
    pub start_time: String,
    pub duration: String,
    pub size: String,
    pub path: String,
    pub risk_count: u32,
}

pub fn is_recording_file(file_name: &str) -> bool {
    file_name.rsplit_once('.').is_some_and(|(_, ext)| {
        RECORDING_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}
