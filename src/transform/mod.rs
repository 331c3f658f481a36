//! Feature transformers.
//!
//! Pure functions over frames, applied by the dataset assembler in a fixed
//! order:
//!
//! 1. [`dates::timestamps_to_day_offsets`]: absolute timestamps become
//!    integer day offsets from the first record
//! 2. [`encoding::one_hot_encode`]: categorical columns fan out into
//!    indicator fields
//! 3. [`encoding::binarize`]: yes/no and categorical-as-binary columns
//!    become 0/1
//! 4. [`impute::impute_missing`]: remaining missing values become the
//!    per-column mean (label split off first; labels are never imputed)
//!
//! Each transformer consumes its frame and returns a new one. None of them
//! reorder records, which is what keeps the feature/label alignment
//! invariant intact across stages.

pub mod dates;
pub mod encoding;
pub mod impute;

pub use dates::{days_between, timestamps_to_day_offsets};
pub use encoding::{binarize, one_hot_encode, OneHotVocabulary};
pub use impute::impute_missing;
