use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::preference::UserPreference;
use crate::domain::swipe::{
    BucketStats, DirectionCounts, NewSwipe, RecordedSwipe, SwipeHistoryEntry, SwipeRecord,
};
use crate::domain::types::{EventId, SwipeDirection, UserId};
use crate::models::swipe::{
    NewSwipe as DbNewSwipe, NewSwipeHistory as DbNewSwipeHistory, Swipe as DbSwipe,
    SwipeHistory as DbSwipeHistory,
};
use crate::repository::preference::adjust_stored_score;
use crate::repository::{
    DieselRepository, RepositoryResult, SwipeListQuery, SwipeReader, SwipeWriter,
};

fn collect_counts(rows: Vec<(String, i64)>) -> RepositoryResult<DirectionCounts> {
    let mut counts = DirectionCounts::default();
    for (direction, count) in rows {
        counts.add(SwipeDirection::try_from(direction)?, count as usize);
    }
    Ok(counts)
}

fn user_swipes<'a>(
    user_id: &'a str,
    directions: &'a [&'a str],
) -> crate::schema::swipes::BoxedQuery<'a, Sqlite> {
    use crate::schema::swipes;

    let mut items = swipes::table
        .filter(swipes::user_id.eq(user_id))
        .into_boxed::<Sqlite>();
    if !directions.is_empty() {
        items = items.filter(swipes::direction.eq_any(directions.iter().copied()));
    }
    items
}

impl SwipeReader for DieselRepository {
    fn get_swipe(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> RepositoryResult<Option<SwipeRecord>> {
        use crate::schema::swipes;

        let mut conn = self.conn()?;

        let swipe = swipes::table
            .filter(swipes::user_id.eq(user_id.as_str()))
            .filter(swipes::event_id.eq(event_id.as_str()))
            .select(DbSwipe::as_select())
            .first::<DbSwipe>(&mut conn)
            .optional()?;

        let swipe = swipe.map(TryInto::try_into).transpose()?;
        Ok(swipe)
    }

    fn list_swipes(&self, query: SwipeListQuery) -> RepositoryResult<(usize, Vec<SwipeRecord>)> {
        use crate::schema::swipes;

        let mut conn = self.conn()?;

        let directions: Vec<&str> = query.directions.iter().map(|d| d.as_str()).collect();
        let query_builder = || user_swipes(query.user_id.as_str(), &directions);

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset() as i64)
                .limit(pagination.per_page as i64);
        }

        let items = items
            .order((swipes::updated_at.desc(), swipes::event_id.asc()))
            .load::<DbSwipe>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SwipeRecord>, _>>()?;

        Ok((total, items))
    }

    fn swipe_stats(&self, user_id: &UserId) -> RepositoryResult<BucketStats> {
        use crate::schema::swipes;

        let mut conn = self.conn()?;

        // Both reads share one transaction so they observe the same snapshot.
        let (rows, last_swiped_at) = conn.transaction(|conn| {
            let rows = swipes::table
                .filter(swipes::user_id.eq(user_id.as_str()))
                .group_by(swipes::direction)
                .select((swipes::direction, diesel::dsl::count_star()))
                .load::<(String, i64)>(conn)?;

            let last = swipes::table
                .filter(swipes::user_id.eq(user_id.as_str()))
                .select(diesel::dsl::max(swipes::updated_at))
                .get_result::<Option<NaiveDateTime>>(conn)?;

            Ok::<_, diesel::result::Error>((rows, last))
        })?;

        Ok(BucketStats::new(collect_counts(rows)?, last_swiped_at))
    }

    fn count_event_swipes(&self, event_id: &EventId) -> RepositoryResult<DirectionCounts> {
        use crate::schema::swipes;

        let mut conn = self.conn()?;

        let rows = swipes::table
            .filter(swipes::event_id.eq(event_id.as_str()))
            .group_by(swipes::direction)
            .select((swipes::direction, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)?;

        collect_counts(rows)
    }

    fn list_swipe_history(&self, user_id: &UserId) -> RepositoryResult<Vec<SwipeHistoryEntry>> {
        use crate::schema::swipe_history;

        let mut conn = self.conn()?;

        let entries = swipe_history::table
            .filter(swipe_history::user_id.eq(user_id.as_str()))
            .order(swipe_history::id.asc())
            .select(DbSwipeHistory::as_select())
            .load::<DbSwipeHistory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SwipeHistoryEntry>, _>>()?;

        Ok(entries)
    }

    fn list_swiping_users(&self) -> RepositoryResult<Vec<UserId>> {
        use crate::schema::swipe_history;

        let mut conn = self.conn()?;

        let users = swipe_history::table
            .select(swipe_history::user_id)
            .distinct()
            .order(swipe_history::user_id.asc())
            .load::<String>(&mut conn)?
            .into_iter()
            .map(UserId::new)
            .collect::<Result<Vec<UserId>, _>>()?;

        Ok(users)
    }
}

impl SwipeWriter for DieselRepository {
    fn record_swipe(&self, swipe: &NewSwipe) -> RepositoryResult<RecordedSwipe> {
        use crate::schema::{swipe_history, swipes};

        let mut conn = self.conn()?;
        let db_swipe = DbNewSwipe::from(swipe);
        let db_history = DbNewSwipeHistory::from(swipe);

        // IMMEDIATE takes the write lock up front so concurrent writers queue
        // behind each other; the score is adjusted in history order.
        let (stored, preference) = conn.immediate_transaction(|conn| {
            diesel::insert_into(swipes::table)
                .values(&db_swipe)
                .on_conflict((swipes::user_id, swipes::event_id))
                .do_update()
                .set((
                    swipes::direction.eq(db_swipe.direction),
                    swipes::updated_at.eq(db_swipe.updated_at),
                ))
                .execute(conn)?;

            diesel::insert_into(swipe_history::table)
                .values(&db_history)
                .execute(conn)?;

            let preference = adjust_stored_score(
                conn,
                db_swipe.user_id,
                swipe.category,
                swipe.direction,
                swipe.swiped_at,
            )?;

            let stored = swipes::table
                .filter(swipes::user_id.eq(db_swipe.user_id))
                .filter(swipes::event_id.eq(db_swipe.event_id))
                .select(DbSwipe::as_select())
                .first::<DbSwipe>(conn)?;

            Ok::<_, diesel::result::Error>((stored, preference))
        })?;

        Ok(RecordedSwipe {
            record: SwipeRecord::try_from(stored)?,
            preference: UserPreference::try_from(preference)?,
        })
    }

    fn remove_swipe(&self, user_id: &UserId, event_id: &EventId) -> RepositoryResult<usize> {
        use crate::schema::swipes;

        let mut conn = self.conn()?;

        let affected = diesel::delete(
            swipes::table
                .filter(swipes::user_id.eq(user_id.as_str()))
                .filter(swipes::event_id.eq(event_id.as_str())),
        )
        .execute(&mut conn)?;

        Ok(affected)
    }
}
