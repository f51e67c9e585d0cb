//! Boundary validation for swipe submissions.
//!
//! Clients send loosely typed payloads; these forms turn them into typed
//! payloads before anything reaches the ledger.

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{EventId, SwipeAction, SwipeDirection, TypeConstraintError, UserId};
use crate::gesture::Vector2;

#[derive(Debug, Error)]
pub enum SwipeFormError {
    #[error("Swipe form validation failed: {0}")]
    Validation(String),
    #[error("Swipe form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Action {action} does not match direction {direction}")]
    ActionMismatch {
        action: SwipeAction,
        direction: SwipeDirection,
    },
}

impl From<ValidationErrors> for SwipeFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SwipeFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// A swipe whose direction the client has already decided.
#[derive(Deserialize, Validate)]
pub struct SwipeForm {
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,
    #[validate(length(min = 1, max = 255))]
    pub event_id: String,
    #[validate(length(min = 1))]
    pub direction: String,
    /// Optional explicit action; must agree with `direction` when present.
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipeFormPayload {
    pub user_id: UserId,
    pub event_id: EventId,
    pub direction: SwipeDirection,
}

impl TryFrom<SwipeForm> for SwipeFormPayload {
    type Error = SwipeFormError;

    fn try_from(value: SwipeForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let direction = SwipeDirection::try_from(value.direction)?;

        if let Some(action) = value.action {
            let action = SwipeAction::try_from(action)?;
            if direction.action() != action {
                return Err(SwipeFormError::ActionMismatch { action, direction });
            }
        }

        Ok(Self {
            user_id: UserId::new(value.user_id)?,
            event_id: EventId::new(value.event_id)?,
            direction,
        })
    }
}

/// A raw gesture snapshot taken when the user released the card.
#[derive(Deserialize, Validate)]
pub struct GestureForm {
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,
    #[validate(length(min = 1, max = 255))]
    pub event_id: String,
    pub translation_x: f64,
    pub translation_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureFormPayload {
    pub user_id: UserId,
    pub event_id: EventId,
    pub translation: Vector2,
    pub velocity: Vector2,
}

impl TryFrom<GestureForm> for GestureFormPayload {
    type Error = SwipeFormError;

    fn try_from(value: GestureForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let translation = Vector2::new(value.translation_x, value.translation_y);
        let velocity = Vector2::new(value.velocity_x, value.velocity_y);
        let finite = [translation.x, translation.y, velocity.x, velocity.y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(SwipeFormError::TypeConstraint(
                "gesture vectors must be finite".to_string(),
            ));
        }

        Ok(Self {
            user_id: UserId::new(value.user_id)?,
            event_id: EventId::new(value.event_id)?,
            translation,
            velocity,
        })
    }
}
