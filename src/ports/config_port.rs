//! Configuration access port trait.

use crate::domain::error::PivotError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// A present value that is not a recognised boolean is an error, not the default.
    fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>, PivotError>;

    /// Comma-separated list; blank items are dropped.
    fn get_list(&self, section: &str, key: &str) -> Option<Vec<String>> {
        self.get_string(section, key).map(|raw| {
            raw.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
    }
}
