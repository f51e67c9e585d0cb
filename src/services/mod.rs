pub use errors::{ServiceError, ServiceResult};

pub mod buckets;
pub mod errors;
pub mod preferences;
pub mod swipes;
