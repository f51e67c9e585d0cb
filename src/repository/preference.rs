use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::preference::UserPreference;
use crate::domain::types::{EventCategory, PreferenceScore, SwipeDirection, UserId};
use crate::models::preference::PreferenceScoreRow;
use crate::repository::{DieselRepository, PreferenceReader, PreferenceWriter, RepositoryResult};

impl PreferenceReader for DieselRepository {
    fn get_preference(
        &self,
        user_id: &UserId,
        category: EventCategory,
    ) -> RepositoryResult<Option<UserPreference>> {
        use crate::schema::preference_scores;

        let mut conn = self.conn()?;

        let preference = preference_scores::table
            .filter(preference_scores::user_id.eq(user_id.as_str()))
            .filter(preference_scores::category.eq(category.as_str()))
            .first::<PreferenceScoreRow>(&mut conn)
            .optional()?;

        let preference = preference.map(TryInto::try_into).transpose()?;
        Ok(preference)
    }

    fn list_preferences(&self, user_id: &UserId) -> RepositoryResult<Vec<UserPreference>> {
        use crate::schema::preference_scores;

        let mut conn = self.conn()?;

        let mut preferences = preference_scores::table
            .filter(preference_scores::user_id.eq(user_id.as_str()))
            .load::<PreferenceScoreRow>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<UserPreference>, _>>()?;

        // Stored as text; order by the enum rather than alphabetically.
        preferences.sort_by_key(|p| p.category);
        Ok(preferences)
    }
}

/// Applies one swipe's adjustment to the stored score on `conn`.
///
/// Callers run this inside an `IMMEDIATE` transaction so the read and the
/// upsert see no interleaved writer.
pub(super) fn adjust_stored_score(
    conn: &mut SqliteConnection,
    user_id: &str,
    category: EventCategory,
    direction: SwipeDirection,
    at: NaiveDateTime,
) -> QueryResult<PreferenceScoreRow> {
    use crate::schema::preference_scores;

    let current = preference_scores::table
        .filter(preference_scores::user_id.eq(user_id))
        .filter(preference_scores::category.eq(category.as_str()))
        .select(preference_scores::score)
        .first::<f64>(conn)
        .optional()?;

    // Out-of-range stored values are clamped back into bounds.
    let score = current
        .map_or(PreferenceScore::ZERO, |value| {
            PreferenceScore::ZERO.saturating_add(value)
        })
        .after_swipe(direction);

    let row = PreferenceScoreRow {
        user_id: user_id.to_string(),
        category: category.as_str().to_string(),
        score: score.get(),
        updated_at: at,
    };

    diesel::insert_into(preference_scores::table)
        .values(&row)
        .on_conflict((preference_scores::user_id, preference_scores::category))
        .do_update()
        .set((
            preference_scores::score.eq(row.score),
            preference_scores::updated_at.eq(row.updated_at),
        ))
        .execute(conn)?;

    Ok(row)
}

impl PreferenceWriter for DieselRepository {
    fn apply_swipe_adjustment(
        &self,
        user_id: &UserId,
        category: EventCategory,
        direction: SwipeDirection,
        at: NaiveDateTime,
    ) -> RepositoryResult<UserPreference> {
        let mut conn = self.conn()?;

        let row = conn.immediate_transaction(|conn| {
            adjust_stored_score(conn, user_id.as_str(), category, direction, at)
        })?;

        Ok(UserPreference::try_from(row)?)
    }

    fn replace_preferences(
        &self,
        user_id: &UserId,
        preferences: &[UserPreference],
    ) -> RepositoryResult<usize> {
        use crate::schema::preference_scores;

        let mut conn = self.conn()?;
        let rows = preferences
            .iter()
            .map(PreferenceScoreRow::from)
            .collect::<Vec<PreferenceScoreRow>>();

        let affected = conn.immediate_transaction(|conn| {
            diesel::delete(
                preference_scores::table.filter(preference_scores::user_id.eq(user_id.as_str())),
            )
            .execute(conn)?;

            if rows.is_empty() {
                return Ok(0);
            }
            diesel::insert_into(preference_scores::table)
                .values(&rows)
                .execute(conn)
        })?;

        Ok(affected)
    }
}
