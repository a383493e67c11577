use crate::slug::Slug;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full slug-to-record mapping as it is persisted.
pub type LinkMap = BTreeMap<Slug, LinkRecord>;

/// A stored link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The original URL, exactly as entered (after trimming).
    pub original: String,
    /// When the link was created. Persisted as epoch milliseconds.
    #[serde(rename = "created", with = "epoch_millis")]
    pub created_at: Timestamp,
}

impl LinkRecord {
    pub fn new(original: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            original: original.into(),
            created_at,
        }
    }
}

mod epoch_millis {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(timestamp.as_millisecond())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        Timestamp::from_millisecond(millis).map_err(serde::de::Error::custom)
    }
}
