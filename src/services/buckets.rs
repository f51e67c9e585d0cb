//! Read-only bucket views over the swipe ledger.
//!
//! Nothing here is stored: every view is a query against the live records.

use crate::domain::swipe::{BucketStats, EventSwipeAnalytics, SwipeRecord};
use crate::domain::types::{Bucket, EventId, SwipeDirection, UserId};
use crate::pagination::Pagination;
use crate::repository::{SwipeListQuery, SwipeReader};
use crate::services::swipes::list_by_direction;

use super::{ServiceError, ServiceResult};

/// Events the user is going to privately.
pub fn get_going<R: SwipeReader>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<SwipeRecord>> {
    list_by_direction(repo, user_id, Bucket::Going.direction())
}

/// Events the user is going to and shares publicly.
pub fn get_public<R: SwipeReader>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<SwipeRecord>> {
    list_by_direction(repo, user_id, Bucket::Public.direction())
}

/// Events saved for later.
pub fn get_saved<R: SwipeReader>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<SwipeRecord>> {
    list_by_direction(repo, user_id, Bucket::Saved.direction())
}

/// Events the user passed on.
pub fn get_passed<R: SwipeReader>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<SwipeRecord>> {
    list_by_direction(repo, user_id, Bucket::Pass.direction())
}

/// Every committed event (going or public), most recently updated first.
pub fn get_calendar<R: SwipeReader>(
    repo: &R,
    user_id: &UserId,
) -> ServiceResult<Vec<SwipeRecord>> {
    list_calendar_page(repo, user_id, None).map(|(_total, items)| items)
}

/// One page of the calendar together with the total number of entries.
pub fn list_calendar_page<R: SwipeReader>(
    repo: &R,
    user_id: &UserId,
    pagination: Option<Pagination>,
) -> ServiceResult<(usize, Vec<SwipeRecord>)> {
    let commitments: Vec<SwipeDirection> = SwipeDirection::ALL
        .iter()
        .copied()
        .filter(|d| d.is_commitment())
        .collect();
    let mut query = SwipeListQuery::new(user_id.clone()).directions(&commitments);
    query.pagination = pagination;

    match repo.list_swipes(query) {
        Ok(page) => Ok(page),
        Err(e) => {
            log::error!("Failed to list calendar: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Bucket tallies and last activity for a user.
pub fn get_stats<R: SwipeReader>(repo: &R, user_id: &UserId) -> ServiceResult<BucketStats> {
    match repo.swipe_stats(user_id) {
        Ok(stats) => Ok(stats),
        Err(e) => {
            log::error!("Failed to get swipe stats: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// How all users currently file one event.
pub fn event_analytics<R: SwipeReader>(
    repo: &R,
    event_id: &EventId,
) -> ServiceResult<EventSwipeAnalytics> {
    match repo.count_event_swipes(event_id) {
        Ok(counts) => Ok(EventSwipeAnalytics::new(event_id.clone(), counts)),
        Err(e) => {
            log::error!("Failed to count event swipes: {e}");
            Err(ServiceError::from(e))
        }
    }
}
