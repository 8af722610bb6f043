//! Cupping (SCA tasting) notes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// The ten SCA sub-scores, each 0 to 10 in quarter points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct ScaScores {
    #[validate(range(min = 0.0, max = 10.0))]
    pub fragrance_aroma: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub flavor: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub aftertaste: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub acidity: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub body: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub balance: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub uniformity: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub clean_cup: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub sweetness: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub overall: f64,
}

impl ScaScores {
    fn values(&self) -> [(&'static str, f64); 10] {
        [
            ("fragrance_aroma", self.fragrance_aroma),
            ("flavor", self.flavor),
            ("aftertaste", self.aftertaste),
            ("acidity", self.acidity),
            ("body", self.body),
            ("balance", self.balance),
            ("uniformity", self.uniformity),
            ("clean_cup", self.clean_cup),
            ("sweetness", self.sweetness),
            ("overall", self.overall),
        ]
    }

    /// Total on the 0-100 scale
    pub fn total(&self) -> f64 {
        self.values().iter().map(|(_, v)| v).sum()
    }

    /// Range and quarter-point granularity check
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        for (name, value) in self.values() {
            if (value * 4.0).fract() != 0.0 {
                return Err(AppError::Validation(format!(
                    "{} must be a multiple of 0.25 (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Stored cupping note
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CuppingNote {
    pub id: Uuid,
    pub account_id: Uuid,
    pub brew_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub scores: ScaScores,
    pub flavor_descriptors: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cupping note with its total score computed on read
#[derive(Debug, Serialize, ToSchema)]
pub struct CuppingNoteView {
    #[serde(flatten)]
    pub note: CuppingNote,
    pub total_score: f64,
}

impl From<CuppingNote> for CuppingNoteView {
    fn from(note: CuppingNote) -> Self {
        let total_score = note.scores.total();
        Self { note, total_score }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCuppingNote {
    #[serde(flatten)]
    pub scores: ScaScores,
    #[serde(default)]
    pub flavor_descriptors: Vec<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(value: f64) -> ScaScores {
        ScaScores {
            fragrance_aroma: value,
            flavor: value,
            aftertaste: value,
            acidity: value,
            body: value,
            balance: value,
            uniformity: value,
            clean_cup: value,
            sweetness: value,
            overall: value,
        }
    }

    #[test]
    fn test_total_is_sum_of_sub_scores() {
        let mut s = scores(8.0);
        s.flavor = 8.75;
        s.overall = 7.25;
        assert_eq!(s.total(), 80.0);
        assert_eq!(scores(10.0).total(), 100.0);
    }

    #[test]
    fn test_quarter_point_granularity() {
        assert!(scores(7.75).check().is_ok());

        let mut s = scores(8.0);
        s.body = 8.1;
        assert!(matches!(s.check(), Err(AppError::Validation(msg)) if msg.starts_with("body")));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut s = scores(8.0);
        s.acidity = 10.25;
        assert!(s.check().is_err());
    }
}
