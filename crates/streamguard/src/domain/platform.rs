use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    Douyin,
    TikTok,
    Kuaishou,
    Unknown,
}

impl Platform {
    /// Guess the hosting platform from a stream url.
    pub fn detect(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("douyin") {
            Platform::Douyin
        } else if url.contains("tiktok") {
            Platform::TikTok
        } else if url.contains("kuaishou") {
            Platform::Kuaishou
        } else {
            Platform::Unknown
        }
    }

    /// Match a directory name written by the recorder, e.g. `抖音直播` or `TikTok`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("douyin") || label.contains("抖音") {
            Platform::Douyin
        } else if lower.contains("tiktok") {
            Platform::TikTok
        } else if lower.contains("kuaishou") || label.contains("快手") {
            Platform::Kuaishou
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Douyin => "Douyin",
            Platform::TikTok => "TikTok",
            Platform::Kuaishou => "Kuaishou",
            Platform::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_hosts() {
        assert_eq!(
            Platform::detect("https://live.douyin.com/123"),
            Platform::Douyin
        );
        assert_eq!(
            Platform::detect("https://www.tiktok.com/@a/live"),
            Platform::TikTok
        );
        assert_eq!(
            Platform::detect("https://live.kuaishou.com/u/abc"),
            Platform::Kuaishou
        );
        assert_eq!(Platform::detect("https://x.test/a"), Platform::Unknown);
    }

    #[test]
    fn douyin_wins_over_later_matches() {
        assert_eq!(
            Platform::detect("https://douyin.test/?ref=tiktok"),
            Platform::Douyin
        );
    }

    #[test]
    fn labels_from_recorder_directories() {
        assert_eq!(Platform::from_label("抖音直播"), Platform::Douyin);
        assert_eq!(Platform::from_label("快手直播"), Platform::Kuaishou);
        assert_eq!(Platform::from_label("TikTok直播"), Platform::TikTok);
        assert_eq!(Platform::from_label("misc"), Platform::Unknown);
    }
}
