//! Resource quota admission: flatten declared limits into resource lists
//! and check whether one list fits within another.

pub mod admission;
pub mod fit;
pub mod normalize;

pub use admission::{FieldViolation, ProjectQuotaValidator};
pub use fit::quota_fits;
pub use normalize::{ConvertError, LimitNormalizer, SuffixRules, convert_limit_to_resource_list};
