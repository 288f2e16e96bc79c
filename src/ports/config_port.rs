//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    /// True when the key is present, even with a blank value.
    fn has_key(&self, section: &str, key: &str) -> bool;
}
