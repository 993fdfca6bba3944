//! Shared data model for the TRAIL constellation: the history records a
//! capture layer produces and the category taxonomy both sides agree on.

use serde::{Deserialize, Serialize};

mod classify;

pub use classify::{classify, CATEGORY_PATTERNS};

/// Topical category assigned to a visit, used for node coloring and
/// wormhole detection. Serialized lowercase to match the capture layer's
/// export format; unknown strings fall back to `Other` so older engines
/// keep reading newer exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tech,
    Social,
    News,
    Edu,
    Shopping,
    Entertainment,
    Finance,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tech => "Technology",
            Self::Social => "Social Media",
            Self::News => "News",
            Self::Edu => "Education",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Finance => "Finance",
            Self::Other => "Other",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Tech => "#3b82f6",
            Self::Social => "#ec4899",
            Self::News => "#f59e0b",
            Self::Edu => "#10b981",
            Self::Shopping => "#ef4444",
            Self::Entertainment => "#8b5cf6",
            Self::Finance => "#14b8a6",
            Self::Other => "#6b7280",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

/// Query window keys understood by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "1h",
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
            Self::All => "all",
        }
    }

    /// Inclusive lower bound (epoch ms) for records in this range.
    pub fn cutoff(self, now_ms: i64) -> i64 {
        const HOUR: i64 = 60 * 60 * 1000;
        match self {
            Self::Hour => now_ms - HOUR,
            Self::Day => now_ms - 24 * HOUR,
            Self::Week => now_ms - 7 * 24 * HOUR,
            Self::Month => now_ms - 30 * 24 * HOUR,
            Self::All => 0,
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Day
    }
}

/// One captured page visit, ordered by `timestamp` ascending within a
/// query result. Field names mirror the capture layer's JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    /// Epoch milliseconds of the visit.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub content_snippet: Option<String>,
    /// Seconds spent on the page, when the capture layer measured it.
    #[serde(default)]
    pub dwell_time: Option<f32>,
}

impl HistoryRecord {
    /// A record without a usable timestamp or any address is skipped by
    /// the graph builder rather than failing the whole build.
    pub fn is_wellformed(&self) -> bool {
        self.timestamp > 0 && !(self.domain.is_empty() && self.url.is_empty())
    }

    /// Text used for semantic comparison: the extracted snippet when
    /// present and non-empty, otherwise the page title.
    pub fn text(&self) -> &str {
        match &self.content_snippet {
            Some(s) if !s.is_empty() => s,
            _ => &self.title,
        }
    }

    /// Normalized domain used as node identity in per-domain mode.
    pub fn domain_key(&self) -> String {
        if self.domain.is_empty() {
            extract_domain(&self.url)
        } else {
            let lower = self.domain.to_lowercase();
            lower.trim_start_matches("www.").to_string()
        }
    }

    /// Category from the record when the capture layer set one,
    /// otherwise derived from the address.
    pub fn category(&self) -> Category {
        self.category
            .unwrap_or_else(|| classify(&self.domain_key(), &self.url))
    }
}

/// Hostname portion of a URL with any leading `www.` stripped.
pub fn extract_domain(url: &str) -> String {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = host.split('@').last().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    host.trim_start_matches("www.").to_lowercase()
}
