//! Item definitions and the administered-response log entry.

use crate::domain::Domain;
use cat_common::ItemId;
use serde::{Deserialize, Serialize};

/// Calibration quality flag assigned by the collaborator's calibration
/// pipeline; only `Normal` items are selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    Normal,
    Flagged,
}

/// A calibrated test item. Immutable once calibrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub domain: Domain,
    /// Discrimination parameter `a`, typically 0.5-2.5.
    pub discrimination: f64,
    /// Difficulty parameter `b`, typically -3.0 to +3.0.
    pub difficulty: f64,
    pub se_discrimination: Option<f64>,
    pub se_difficulty: Option<f64>,
    pub active: bool,
    pub quality: QualityFlag,
}

impl Item {
    /// The calibration well-formedness condition from the item definition:
    /// active, not flagged, and has finite `a > 0` and finite `b`.
    ///
    /// This is independent of per-session/per-user history, which the
    /// item-pool view applies separately.
    pub fn is_eligible_params(&self) -> bool {
        self.active
            && self.quality == QualityFlag::Normal
            && self.discrimination.is_finite()
            && self.discrimination > 0.0
            && self.difficulty.is_finite()
    }
}

/// One administered response: item id paired with correctness, stamped
/// with the order it was received in.
///
/// Carries the item's calibration parameters at time of administration
/// (rather than requiring a second pool lookup) so ability re-estimation
/// can replay the whole history from this log alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministeredResponse {
    pub sequence: u32,
    pub item_id: ItemId,
    /// `None` when the item could not be resolved against the pool at the
    /// time this response was recorded; such a response still counts toward
    /// `items_administered` but is excluded from `domain_coverage` and
    /// per-domain scoring.
    pub domain: Option<Domain>,
    pub correct: bool,
    pub discrimination: f64,
    pub difficulty: f64,
    pub time_spent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: ItemId::from("pattern-001"),
            domain: Domain::Pattern,
            discrimination: 1.2,
            difficulty: 0.0,
            se_discrimination: Some(0.1),
            se_difficulty: Some(0.1),
            active: true,
            quality: QualityFlag::Normal,
        }
    }

    #[test]
    fn eligible_item_passes() {
        assert!(sample_item().is_eligible_params());
    }

    #[test]
    fn inactive_item_is_ineligible() {
        let mut item = sample_item();
        item.active = false;
        assert!(!item.is_eligible_params());
    }

    #[test]
    fn flagged_item_is_ineligible() {
        let mut item = sample_item();
        item.quality = QualityFlag::Flagged;
        assert!(!item.is_eligible_params());
    }

    #[test]
    fn non_positive_discrimination_is_ineligible() {
        let mut item = sample_item();
        item.discrimination = 0.0;
        assert!(!item.is_eligible_params());
        item.discrimination = -1.0;
        assert!(!item.is_eligible_params());
    }

    #[test]
    fn non_finite_difficulty_is_ineligible() {
        let mut item = sample_item();
        item.difficulty = f64::NAN;
        assert!(!item.is_eligible_params());
        item.difficulty = f64::INFINITY;
        assert!(!item.is_eligible_params());
    }
}
