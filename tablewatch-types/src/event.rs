//! Availability events decoded from the sensor stream.

use alloc::string::String;

/// Payload of one `tableStatus` frame.
///
/// Only [`data`](Self::data) carries meaning; the remaining fields are
/// metadata from the publishing cloud and are kept for logging.
///
/// With the `serde` feature the JSON field names match the sensor cloud:
///
/// ```json
/// {"data":"free","ttl":"60","published_at":"2015-06-01T10:00:00.000Z","coreid":"53ff6d"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvailabilityEvent {
    /// Raw status payload, compared against the sentinel token.
    pub data: String,

    /// Time-to-live announced by the publisher.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "string_or_number")
    )]
    pub ttl: String,

    /// Publication time as sent by the publisher (not parsed).
    #[cfg_attr(
        feature = "serde",
        serde(default, alias = "publishedAt", alias = "publised_at")
    )]
    pub published_at: String,

    /// Identifier of the publishing device.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "coreid", alias = "sourceId", alias = "source_id")
    )]
    pub source_id: String,
}

impl AvailabilityEvent {
    /// Create an event carrying only a data payload.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Publishers disagree on whether `ttl` is a string or a number.
#[cfg(feature = "serde")]
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use alloc::string::ToString;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}
