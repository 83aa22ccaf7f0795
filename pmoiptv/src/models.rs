//! Data models of the channel pipeline
//!
//! A playlist fetch yields [`ChannelRecord`]s, probing turns them into
//! [`ProbedChannelRecord`]s, curation reduces those to the public
//! [`CuratedRecord`] shape and a run ends with one [`Snapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to a channel whose directive carries no trailing label
pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown Channel";

/// Group given to a channel whose directive carries no `group-title`
pub const UNKNOWN_GROUP: &str = "Unknown";

// ============================================================================
// Parsed channels
// ============================================================================

/// One channel of the playlist, as declared by its directive line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    /// Human-readable title (text after the last comma of the directive)
    pub name: String,
    /// Stream endpoint
    pub url: String,
    /// Icon URL (`tvg-logo`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Category label (`group-title`)
    pub group: String,
    /// Alternate identifier (`tvg-name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvg_name: Option<String>,
    /// Numeric hint following the marker; `-1` is stored as `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl ChannelRecord {
    /// Create a record with only a name and an endpoint
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            logo: None,
            group: UNKNOWN_GROUP.to_string(),
            tvg_name: None,
            duration: None,
        }
    }

    /// Attach a probe outcome
    pub fn probed(self, enabled: bool) -> ProbedChannelRecord {
        ProbedChannelRecord {
            channel: self,
            enabled,
        }
    }
}

/// A channel together with the outcome of its availability probe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbedChannelRecord {
    #[serde(flatten)]
    pub channel: ChannelRecord,
    pub enabled: bool,
}

// ============================================================================
// Public shape
// ============================================================================

/// The public-facing shape of a channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct CuratedRecord {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
}

impl From<ProbedChannelRecord> for CuratedRecord {
    fn from(record: ProbedChannelRecord) -> Self {
        Self {
            name: record.channel.name,
            url: record.channel.url,
            enabled: record.enabled,
        }
    }
}

/// The artifact written at the end of every successful run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct Snapshot {
    #[serde(with = "iso_millis")]
    #[cfg_attr(feature = "server", schema(value_type = String, format = DateTime))]
    pub last_updated: DateTime<Utc>,
    pub total_streams: usize,
    pub enabled_streams: usize,
    pub streams: Vec<CuratedRecord>,
}

impl Snapshot {
    /// Build a snapshot stamped with the current instant
    pub fn new(streams: Vec<CuratedRecord>) -> Self {
        Self::at(Utc::now(), streams)
    }

    /// Build a snapshot stamped with the given instant
    pub fn at(last_updated: DateTime<Utc>, streams: Vec<CuratedRecord>) -> Self {
        Self {
            last_updated,
            total_streams: streams.len(),
            enabled_streams: streams.iter().filter(|s| s.enabled).count(),
            streams,
        }
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats::new(self.total_streams, self.enabled_streams)
    }
}

/// Summary counts reported after a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct StreamStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    /// `round(enabled / total * 100)`, 0 for an empty list
    pub enabled_percentage: u32,
}

impl StreamStats {
    pub fn new(total: usize, enabled: usize) -> Self {
        let enabled_percentage = if total == 0 {
            0
        } else {
            (enabled as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            enabled,
            disabled: total.saturating_sub(enabled),
            enabled_percentage,
        }
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
