use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::swipe::{
    NewSwipe as DomainNewSwipe, SwipeHistoryEntry as DomainSwipeHistoryEntry,
    SwipeRecord as DomainSwipeRecord,
};
use crate::domain::types::{EventCategory, EventId, SwipeDirection, TypeConstraintError, UserId};

/// Diesel model representing a row in the `swipes` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::swipes)]
pub struct Swipe {
    pub user_id: String,
    pub event_id: String,
    pub direction: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Swipe`]; on conflict only the direction and
/// `updated_at` are overwritten.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::swipes)]
pub struct NewSwipe<'a> {
    pub user_id: &'a str,
    pub event_id: &'a str,
    pub direction: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Diesel model representing a row in the append-only `swipe_history` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::swipe_history)]
pub struct SwipeHistory {
    pub id: i64,
    pub user_id: String,
    pub event_id: String,
    pub category: String,
    pub direction: String,
    pub swiped_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::swipe_history)]
pub struct NewSwipeHistory<'a> {
    pub user_id: &'a str,
    pub event_id: &'a str,
    pub category: &'a str,
    pub direction: &'a str,
    pub swiped_at: NaiveDateTime,
}

impl TryFrom<Swipe> for DomainSwipeRecord {
    type Error = TypeConstraintError;

    fn try_from(swipe: Swipe) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(swipe.user_id)?,
            event_id: EventId::new(swipe.event_id)?,
            direction: SwipeDirection::try_from(swipe.direction)?,
            created_at: swipe.created_at,
            updated_at: swipe.updated_at,
        })
    }
}

impl TryFrom<SwipeHistory> for DomainSwipeHistoryEntry {
    type Error = TypeConstraintError;

    fn try_from(row: SwipeHistory) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence: row.id,
            user_id: UserId::new(row.user_id)?,
            event_id: EventId::new(row.event_id)?,
            category: EventCategory::try_from(row.category)?,
            direction: SwipeDirection::try_from(row.direction)?,
            swiped_at: row.swiped_at,
        })
    }
}

impl<'a> From<&'a DomainNewSwipe> for NewSwipe<'a> {
    fn from(swipe: &'a DomainNewSwipe) -> Self {
        Self {
            user_id: swipe.user_id.as_str(),
            event_id: swipe.event_id.as_str(),
            direction: swipe.direction.as_str(),
            created_at: swipe.swiped_at,
            updated_at: swipe.swiped_at,
        }
    }
}

impl<'a> From<&'a DomainNewSwipe> for NewSwipeHistory<'a> {
    fn from(swipe: &'a DomainNewSwipe) -> Self {
        Self {
            user_id: swipe.user_id.as_str(),
            event_id: swipe.event_id.as_str(),
            category: swipe.category.as_str(),
            direction: swipe.direction.as_str(),
            swiped_at: swipe.swiped_at,
        }
    }
}
