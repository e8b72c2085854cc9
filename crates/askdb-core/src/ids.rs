//! Identifier attached to each question for log correlation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one `/ask` round trip.
///
/// Internally represented as a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(Uuid);

impl QueryId {
    /// Creates a new random query ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use askdb_core::QueryId;
    ///
    /// let id = QueryId::new();
    /// println!("Query ID: {}", id);
    /// ```
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a query ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for QueryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_query_ids_are_unique() {
        assert_ne!(QueryId::new(), QueryId::new());
    }

    #[test]
    fn test_query_id_serializes_as_plain_uuid() {
        let uuid = Uuid::from_u128(42);
        let json = serde_json::to_string(&QueryId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    proptest! {
        #[test]
        fn test_query_id_display_parse_roundtrip(raw in any::<u128>()) {
            let id = QueryId::from_uuid(Uuid::from_u128(raw));
            let parsed: QueryId = id.to_string().parse().unwrap();
            prop_assert_eq!(id, parsed);
        }
    }
}
