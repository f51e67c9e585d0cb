use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::preference::UserPreference;
use crate::domain::types::{EventCategory, PreferenceScore, TypeConstraintError, UserId};

/// Diesel model representing the `preference_scores` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::preference_scores)]
pub struct PreferenceScoreRow {
    pub user_id: String,
    pub category: String,
    pub score: f64,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PreferenceScoreRow> for UserPreference {
    type Error = TypeConstraintError;

    fn try_from(row: PreferenceScoreRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(row.user_id)?,
            category: EventCategory::try_from(row.category)?,
            score: PreferenceScore::new(row.score)?,
            updated_at: row.updated_at,
        })
    }
}

impl From<&UserPreference> for PreferenceScoreRow {
    fn from(preference: &UserPreference) -> Self {
        Self {
            user_id: preference.user_id.as_str().to_string(),
            category: preference.category.as_str().to_string(),
            score: preference.score.get(),
            updated_at: preference.updated_at,
        }
    }
}
