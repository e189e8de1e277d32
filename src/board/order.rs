//! Order sums for all game phases.
//!
//! Movement-phase orders are the tagged [`OrderKind`] sum; retreats and
//! adjustments have their own, smaller sums. Every stored order carries
//! its position and a result stamped by the resolver. The serde
//! representation (a JSON object with `type`, `province`, and the
//! case-specific fields) is the canonical export form used on the wire
//! and in persisted history.

use serde::{Deserialize, Serialize};

use crate::map::ProvinceId;

use super::unit::UnitType;

/// Resolution outcome of an order, persisted in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderResult {
    #[default]
    Unprocessed,
    Succeeds,
    Fails,
    Dislodged,
}

impl OrderResult {
    pub fn is_unprocessed(&self) -> bool {
        matches!(self, OrderResult::Unprocessed)
    }
}

/// The movement-phase order cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OrderKind {
    /// Keep the unit in place.
    Hold,
    /// Move to an adjacent province, or across a convoy chain.
    Move {
        dest: ProvinceId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        coast: Option<String>,
        #[serde(default)]
        is_convoy: bool,
    },
    /// Add strength to the unit holding at `supporting`.
    SupportHold { supporting: ProvinceId },
    /// Add strength to the move `from` -> `supporting`.
    SupportMove {
        supporting: ProvinceId,
        from: ProvinceId,
    },
    /// Carry the army moving `start` -> `end` across this fleet's sea.
    Convoy { start: ProvinceId, end: ProvinceId },
}

/// A movement-phase order issued to the unit at `province`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub province: ProvinceId,
    #[serde(flatten)]
    pub kind: OrderKind,
    #[serde(default, skip_serializing_if = "OrderResult::is_unprocessed")]
    pub result: OrderResult,
}

impl Order {
    pub fn new(province: impl Into<ProvinceId>, kind: OrderKind) -> Order {
        Order {
            province: province.into(),
            kind,
            result: OrderResult::Unprocessed,
        }
    }

    pub fn hold(province: impl Into<ProvinceId>) -> Order {
        Order::new(province, OrderKind::Hold)
    }

    pub fn move_to(province: impl Into<ProvinceId>, dest: impl Into<ProvinceId>) -> Order {
        Order::new(
            province,
            OrderKind::Move {
                dest: dest.into(),
                coast: None,
                is_convoy: false,
            },
        )
    }

    pub fn move_to_coast(
        province: impl Into<ProvinceId>,
        dest: impl Into<ProvinceId>,
        coast: impl Into<String>,
    ) -> Order {
        Order::new(
            province,
            OrderKind::Move {
                dest: dest.into(),
                coast: Some(coast.into()),
                is_convoy: false,
            },
        )
    }

    pub fn move_by_convoy(province: impl Into<ProvinceId>, dest: impl Into<ProvinceId>) -> Order {
        Order::new(
            province,
            OrderKind::Move {
                dest: dest.into(),
                coast: None,
                is_convoy: true,
            },
        )
    }

    pub fn support_hold(
        province: impl Into<ProvinceId>,
        supporting: impl Into<ProvinceId>,
    ) -> Order {
        Order::new(
            province,
            OrderKind::SupportHold {
                supporting: supporting.into(),
            },
        )
    }

    pub fn support_move(
        province: impl Into<ProvinceId>,
        from: impl Into<ProvinceId>,
        supporting: impl Into<ProvinceId>,
    ) -> Order {
        Order::new(
            province,
            OrderKind::SupportMove {
                supporting: supporting.into(),
                from: from.into(),
            },
        )
    }

    pub fn convoy(
        province: impl Into<ProvinceId>,
        start: impl Into<ProvinceId>,
        end: impl Into<ProvinceId>,
    ) -> Order {
        Order::new(
            province,
            OrderKind::Convoy {
                start: start.into(),
                end: end.into(),
            },
        )
    }

    /// Deterministic identity string, used for logging and dependency
    /// tracing.
    pub fn id(&self) -> String {
        match &self.kind {
            OrderKind::Hold => format!("hold:{}", self.province),
            OrderKind::Move { dest, .. } => format!("move:{}-{}", self.province, dest),
            OrderKind::SupportHold { supporting } => {
                format!("suph:{}/{}", self.province, supporting)
            }
            OrderKind::SupportMove { supporting, from } => {
                format!("supm:{}/{}-{}", self.province, from, supporting)
            }
            OrderKind::Convoy { start, end } => {
                format!("conv:{}/{}-{}", self.province, start, end)
            }
        }
    }

    /// The destination of a move order, if this is one.
    pub fn move_dest(&self) -> Option<&ProvinceId> {
        match &self.kind {
            OrderKind::Move { dest, .. } => Some(dest),
            _ => None,
        }
    }

    pub fn is_convoy_move(&self) -> bool {
        matches!(self.kind, OrderKind::Move { is_convoy: true, .. })
    }

    /// Canonical JSON export form.
    pub fn export(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A retreat order for a dislodged unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "retreat", rename_all = "camelCase")]
pub struct RetreatOrder {
    pub province: ProvinceId,
    pub dest: ProvinceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coast: Option<String>,
    #[serde(default, skip_serializing_if = "OrderResult::is_unprocessed")]
    pub result: OrderResult,
}

impl RetreatOrder {
    pub fn new(province: impl Into<ProvinceId>, dest: impl Into<ProvinceId>) -> RetreatOrder {
        RetreatOrder {
            province: province.into(),
            dest: dest.into(),
            coast: None,
            result: OrderResult::Unprocessed,
        }
    }

    pub fn export(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Withdraws the stored in-flight submission touching a province.
/// Consumed at submission time, never stored in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "cancel", rename_all = "camelCase")]
pub struct CancelOrder {
    pub province: ProvinceId,
}

/// The adjustment-phase order cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AdjustKind {
    /// Place a new unit on an owned, vacant home supply center.
    Build {
        province: ProvinceId,
        unit_type: UnitType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        coast: Option<String>,
    },
    /// Remove one of the country's own units.
    Disband { province: ProvinceId },
    /// Voluntarily forgo one build.
    Pass,
}

/// An adjustment-phase submission for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustOrder {
    #[serde(flatten)]
    pub kind: AdjustKind,
    #[serde(default, skip_serializing_if = "OrderResult::is_unprocessed")]
    pub result: OrderResult,
}

impl AdjustOrder {
    pub fn build(province: impl Into<ProvinceId>, unit_type: UnitType) -> AdjustOrder {
        AdjustOrder {
            kind: AdjustKind::Build {
                province: province.into(),
                unit_type,
                coast: None,
            },
            result: OrderResult::Unprocessed,
        }
    }

    pub fn build_fleet_on(
        province: impl Into<ProvinceId>,
        coast: impl Into<String>,
    ) -> AdjustOrder {
        AdjustOrder {
            kind: AdjustKind::Build {
                province: province.into(),
                unit_type: UnitType::Fleet,
                coast: Some(coast.into()),
            },
            result: OrderResult::Unprocessed,
        }
    }

    pub fn disband(province: impl Into<ProvinceId>) -> AdjustOrder {
        AdjustOrder {
            kind: AdjustKind::Disband {
                province: province.into(),
            },
            result: OrderResult::Unprocessed,
        }
    }

    pub fn pass() -> AdjustOrder {
        AdjustOrder {
            kind: AdjustKind::Pass,
            result: OrderResult::Unprocessed,
        }
    }

    /// The province this adjustment touches, if any.
    pub fn province(&self) -> Option<&ProvinceId> {
        match &self.kind {
            AdjustKind::Build { province, .. } | AdjustKind::Disband { province } => Some(province),
            AdjustKind::Pass => None,
        }
    }

    pub fn export(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
