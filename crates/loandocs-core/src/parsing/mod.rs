pub mod dates;
pub mod normalize;
pub mod serial;

pub use dates::{DateNormalizer, DateOutcome};
pub use normalize::{normalize_category, normalize_header};
