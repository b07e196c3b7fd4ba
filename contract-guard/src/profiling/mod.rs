//! Column profiling: selection, run orchestration and typed profiles.

pub mod patterns;
pub mod reducer;
pub mod types;

pub use patterns::ProfileSelection;
pub use reducer::{profile_data_source, ProfileLimits};
pub use types::{
    ColumnProfile, FrequentValue, Histogram, NumericProfile, ProfileDetail, ProfileRunResult,
    ProfileTable, TextProfile,
};
