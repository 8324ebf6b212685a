//! In-memory payload for [`FittingData`].
//!
//! The payload is a plain serde value:
//!
//! ```text
//! {
//!   "data": { "<name>": [f64, ...], ... },   // full columns, mask ignored
//!   "x_column": "<name>" | null,
//!   "xerr_column": "<name>" | null,
//!   "y_column": "<name>" | null,
//!   "yerr_column": "<name>" | null,
//!   "indices": [bool, ...]
//! }
//! ```
//!
//! Column order is kept through the `data` map. Unknown keys are ignored when
//! reading.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::data::fitting_data::FittingData;
use crate::data::roles::{ColumnRef, Role, RoleHints};
use crate::error::Result;

/// Ordered `name → values` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable(pub Vec<(String, Vec<f64>)>);

impl Serialize for ColumnTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, values) in &self.0 {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ColumnTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to numeric arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ColumnTable, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, values)) = access.next_entry::<String, Vec<f64>>()? {
                    columns.push((name, values));
                }
                Ok(ColumnTable(columns))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittingDataPayload {
    pub data: ColumnTable,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub xerr_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default)]
    pub yerr_column: Option<String>,
    pub indices: Vec<bool>,
}

impl FittingDataPayload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl FittingData {
    pub fn serialize(&self) -> FittingDataPayload {
        let role = |role: Role| self.role_column(role).map(str::to_string);
        FittingDataPayload {
            data: ColumnTable(
                self.columns()
                    .map(|(name, values)| (name.to_string(), values.to_vec()))
                    .collect(),
            ),
            x_column: role(Role::X),
            xerr_column: role(Role::Xerr),
            y_column: role(Role::Y),
            yerr_column: role(Role::Yerr),
            indices: self.records_indices().to_vec(),
        }
    }

    /// Rebuild data from a payload.
    ///
    /// Role derivation is disabled so roles absent from the payload stay
    /// absent.
    pub fn deserialize(payload: FittingDataPayload) -> Result<Self> {
        let hints = RoleHints {
            x: payload.x_column.map(ColumnRef::Name),
            xerr: payload.xerr_column.map(ColumnRef::Name),
            y: payload.y_column.map(ColumnRef::Name),
            yerr: payload.yerr_column.map(ColumnRef::Name),
            search: false,
        };
        let mut data = FittingData::new(payload.data.0, hints)?;
        data.set_records_indices(payload.indices)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn data() -> FittingData {
        let columns = vec![
            ("time".to_string(), vec![0.5, 1.5, 2.5, 3.5]),
            ("a".to_string(), vec![0.1, 0.2, 0.3, 0.4]),
            ("speed".to_string(), vec![1.0, 3.0, 5.0, 7.0]),
        ];
        let hints = RoleHints::none().with(Role::X, "time").with(Role::Y, "speed");
        let mut data = FittingData::new(columns, hints).unwrap();
        data.unselect_record(3).unwrap();
        data
    }

    #[test]
    fn round_trip_preserves_everything() {
        let original = data();
        let restored = FittingData::deserialize(original.serialize()).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.xerr_column(), None);
        assert_eq!(restored.records_indices(), &[true, true, false, true]);
    }

    #[test]
    fn json_round_trip_keeps_column_order() {
        let original = data();
        let json = original.serialize().to_json().unwrap();
        let payload = FittingDataPayload::from_json(&json).unwrap();
        assert_eq!(payload.data.0[0].0, "time");
        assert_eq!(payload.data.0[1].0, "a");
        assert_eq!(payload.xerr_column, None);
        assert_eq!(FittingData::deserialize(payload).unwrap(), original);
    }

    #[test]
    fn payload_ignores_mask_for_data() {
        let payload = data().serialize();
        assert_eq!(payload.data.0[2].1, vec![1.0, 3.0, 5.0, 7.0]);
        assert_eq!(payload.indices.len(), 4);
    }

    #[test]
    fn unknown_keys_are_ignored_and_missing_roles_are_null() {
        let json = r#"{
            "data": {"u": [1.0, 2.0], "v": [3.0, 4.0]},
            "y_column": "v",
            "indices": [true, false],
            "comment": "written by hand"
        }"#;
        let data = FittingData::deserialize(FittingDataPayload::from_json(json).unwrap()).unwrap();
        assert_eq!(data.x_column(), None);
        assert_eq!(data.y_column(), Some("v"));
        assert_eq!(data.y().unwrap(), vec![3.0]);
    }

    #[test]
    fn inconsistent_payload_is_rejected() {
        let mut payload = data().serialize();
        payload.indices.pop();
        assert!(matches!(
            FittingData::deserialize(payload),
            Err(Error::RecordsSelection { .. })
        ));

        let mut payload = data().serialize();
        payload.y_column = Some("nope".to_string());
        assert_eq!(
            FittingData::deserialize(payload).unwrap_err(),
            Error::ColumnExistence("nope".to_string())
        );

        assert!(matches!(
            FittingDataPayload::from_json("{\"data\": 3}"),
            Err(Error::Serialization(_))
        ));
    }
}
