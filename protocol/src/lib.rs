//! Persisted wire format shared between the round engine and whatever storage backs it.

use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of an in-flight round, written after every state change and removed on settlement.
///
/// Field names follow the stored record (`amount`, `mineIndices`, ...) so snapshots written by
/// older clients keep loading.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    /// Stake in major currency units; anything `<= 0` means there is no round to recover.
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub mine_indices: Vec<i64>,
    /// Revealed positions in reveal order.
    #[serde(default)]
    pub clicked_indices: Vec<i64>,
    #[serde(default)]
    pub mine_hit: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub mine_count: Option<i64>,
}

impl RoundSnapshot {
    /// Whether this record describes a round worth recovering.
    pub fn has_round(&self) -> bool {
        self.amount > 0.0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Number(i64),
    Float(f64),
    Text(String),
    Null,
}

/// Older clients stored the raw `<select>` value, so the count may arrive as a string.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CountRepr::deserialize(deserializer)? {
        CountRepr::Number(n) => Some(n),
        CountRepr::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        CountRepr::Float(_) => None,
        CountRepr::Text(text) => text.trim().parse().ok(),
        CountRepr::Null => None,
    })
}
