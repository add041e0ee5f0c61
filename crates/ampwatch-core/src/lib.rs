// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Ampwatch.
//!
//! Holds the error taxonomy, the reading/record model with its delta
//! arithmetic, and the [`LogStore`] trait that storage backends implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::AmpwatchError;
pub use traits::LogStore;
pub use types::{
    CustomerInfo, DECIMAL_SCALE, HealthStatus, LogEntry, PersistOutcome, Reading, Record,
    SortOrder, format_fixed,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ampwatch_error_has_all_variants() {
        let _config = AmpwatchError::Config("test".into());
        let _transport = AmpwatchError::Transport {
            message: "test".into(),
            source: None,
        };
        let _login = AmpwatchError::LoginFailed("test".into());
        let _protocol = AmpwatchError::Protocol("test".into());
        let _malformed = AmpwatchError::MalformedReading("test".into());
        let _persist = AmpwatchError::persist("test");
        let _unavailable = AmpwatchError::StorageUnavailable {
            attempts: 1,
            source: Box::new(std::io::Error::other("test")),
        };
        let _denied = AmpwatchError::AccessDenied;
        let _internal = AmpwatchError::Internal("test".into());
    }

    #[test]
    fn log_store_is_object_safe() {
        fn _assert_dyn(_: &dyn LogStore) {}
    }
}
