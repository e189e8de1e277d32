//! Unit types and positions.

use serde::{Deserialize, Serialize};

use crate::map::ProvinceId;

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Army,
    Fleet,
}

/// A military unit on the board.
///
/// Armies live on land and coastal provinces, fleets on seas and coasts.
/// A fleet on a split-coast province carries one of that province's
/// named coasts; every other unit has no coast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub province: ProvinceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coast: Option<String>,
}

impl Unit {
    pub fn army(province: impl Into<ProvinceId>) -> Unit {
        Unit {
            unit_type: UnitType::Army,
            province: province.into(),
            coast: None,
        }
    }

    pub fn fleet(province: impl Into<ProvinceId>) -> Unit {
        Unit {
            unit_type: UnitType::Fleet,
            province: province.into(),
            coast: None,
        }
    }

    pub fn fleet_on(province: impl Into<ProvinceId>, coast: impl Into<String>) -> Unit {
        Unit {
            unit_type: UnitType::Fleet,
            province: province.into(),
            coast: Some(coast.into()),
        }
    }
}
