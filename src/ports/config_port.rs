//! Configuration access port trait.
//!
//! Typed getters fall back to `default` when a key is missing or does not
//! parse; validation of ranges happens in `domain::config_validation`.

use crate::domain::error::RegimeLabError;

pub trait ConfigPort {
    /// Trimmed value, `None` when missing or blank.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Window lengths and counts: a strictly positive integer.
    fn get_positive(&self, section: &str, key: &str, default: i64) -> Result<usize, RegimeLabError> {
        let value = self.get_int(section, key, default);
        usize::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| RegimeLabError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("{key} must be positive, got {value}"),
            })
    }
}
