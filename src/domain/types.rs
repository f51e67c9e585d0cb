//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, enumerations and numeric constraints are enforced at the
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A preference score fell outside [0.0, 1.0] or was not finite.
    #[error("preference score must be between 0.0 and 1.0")]
    InvalidPreferenceScore,
    /// A stored or submitted token did not name a known variant.
    #[error("invalid {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

/// Generates a closed enumeration persisted as a lowercase text token.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:expr, { $($variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// String representation used in persistence.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($token => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::UnknownVariant {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

non_empty_string_newtype!(UserId, "Opaque identifier of a user.", "user_id");
non_empty_string_newtype!(EventId, "Opaque identifier of an event.", "event_id");

text_enum!(
    /// Direction a card was swiped in.
    SwipeDirection, "swipe direction", {
        Right => "right",
        Left => "left",
        Up => "up",
        Down => "down",
    }
);

text_enum!(
    /// User-facing collection an event is filed into.
    Bucket, "bucket", {
        Going => "going",
        Public => "public",
        Saved => "saved",
        Pass => "pass",
    }
);

text_enum!(
    /// Intent attached to a swipe by clients that submit it explicitly.
    SwipeAction, "swipe action", {
        GoingPrivate => "going_private",
        GoingShared => "going_shared",
        NotInterested => "not_interested",
        MaybeLater => "maybe_later",
    }
);

text_enum!(
    /// Fixed set of event categories known to the catalog.
    EventCategory, "event category", {
        Networking => "networking",
        Culture => "culture",
        Fitness => "fitness",
        Food => "food",
        Nightlife => "nightlife",
        Outdoor => "outdoor",
        Professional => "professional",
    }
);

impl SwipeDirection {
    /// Bucket the direction files an event into.
    pub const fn bucket(self) -> Bucket {
        match self {
            Self::Right => Bucket::Going,
            Self::Up => Bucket::Public,
            Self::Down => Bucket::Saved,
            Self::Left => Bucket::Pass,
        }
    }

    /// Action implied by the direction.
    pub const fn action(self) -> SwipeAction {
        match self {
            Self::Right => SwipeAction::GoingPrivate,
            Self::Up => SwipeAction::GoingShared,
            Self::Down => SwipeAction::MaybeLater,
            Self::Left => SwipeAction::NotInterested,
        }
    }

    /// Whether the direction commits the user to attend (going or public).
    pub const fn is_commitment(self) -> bool {
        matches!(self, Self::Right | Self::Up)
    }
}

impl Bucket {
    /// Direction that files events into this bucket.
    pub const fn direction(self) -> SwipeDirection {
        match self {
            Self::Going => SwipeDirection::Right,
            Self::Public => SwipeDirection::Up,
            Self::Saved => SwipeDirection::Down,
            Self::Pass => SwipeDirection::Left,
        }
    }
}

impl From<SwipeAction> for SwipeDirection {
    fn from(value: SwipeAction) -> Self {
        match value {
            SwipeAction::GoingPrivate => Self::Right,
            SwipeAction::GoingShared => Self::Up,
            SwipeAction::MaybeLater => Self::Down,
            SwipeAction::NotInterested => Self::Left,
        }
    }
}

/// Affinity of a user towards a category, saturated to the range [0.0, 1.0].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct PreferenceScore(f64);

impl PreferenceScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    /// Score of a category the user has never swiped.
    pub const ZERO: Self = Self(Self::MIN);

    /// Constructs a validated score.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidPreferenceScore)
        }
    }

    /// Adds `delta` and saturates at the bounds instead of wrapping.
    pub fn saturating_add(self, delta: f64) -> Self {
        Self((self.0 + delta).clamp(Self::MIN, Self::MAX))
    }

    /// Returns the raw `f64` value.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Display for PreferenceScore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for PreferenceScore {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PreferenceScore> for f64 {
    fn from(value: PreferenceScore) -> Self {
        value.0
    }
}

impl PartialEq<f64> for PreferenceScore {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}
