//! pointcast core: history schema, role mapping and leakage-safe features.
//!
//! This crate turns a per-entity, per-period history table into a feature
//! table where every value on a row is computed from strictly earlier rows
//! of the same entity:
//! - Declared column configuration, validated up front
//! - Fixed role mapping (GK/DEF/MID/FWD/AM)
//! - Team outcome derivation from venue flag and paired scores
//! - Trailing 5/3/1-row aggregates
//! - Error taxonomy shared with `pointcast-runner`

pub mod config;
pub mod error;
pub mod features;
pub mod outcome;
pub mod roles;
pub mod rolling;
pub mod schema;
pub mod synthetic;

pub use config::{ColumnNames, FeatureConfig};
pub use error::{Error, ModelError, Result, SchemaError, ValidationError};
pub use features::FeatureBuilder;
pub use roles::Role;
pub use synthetic::{synthetic_history, SyntheticConfig};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<FeatureConfig>();
        require_sync::<FeatureConfig>();
        require_send::<FeatureBuilder>();
        require_sync::<FeatureBuilder>();
        require_send::<Role>();
        require_sync::<Role>();
        require_send::<Error>();
        require_sync::<Error>();
    }
}
