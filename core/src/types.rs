//! Request parameters for the streaming collections.
//!
//! # Design
//! `FilterParams` uses `Option` and owned `Vec`s so every call starts from
//! freshly constructed, empty containers. It derives `Deserialize` so test
//! vectors and the `feedstream` binary can build it from data.

use serde::{Deserialize, Serialize};

/// Parameters for the filtered stream.
///
/// At least one of `track` or `follow` must be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Number of backlog records to replay before live delivery.
    #[serde(default)]
    pub count: Option<i32>,
    #[serde(default)]
    pub delimited: Option<u32>,
    /// Keywords; a record matches if its text contains any of them.
    #[serde(default)]
    pub track: Vec<String>,
    /// User ids whose records should be delivered.
    #[serde(default)]
    pub follow: Vec<String>,
}

impl FilterParams {
    pub fn track<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            track: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn follow<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            follow: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn has_terms(&self) -> bool {
        !self.track.is_empty() || !self.follow.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty() {
        let params = FilterParams::default();
        assert!(params.count.is_none());
        assert!(params.delimited.is_none());
        assert!(!params.has_terms());
    }

    #[test]
    fn deserializes_partial_json() {
        let params: FilterParams = serde_json::from_str(r#"{"track":["rust"]}"#).unwrap();
        assert_eq!(params, FilterParams::track(["rust"]));
        assert!(params.has_terms());
    }
}
