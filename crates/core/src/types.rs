/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a prefixed, time-ordered identifier, e.g. `snap_0190c3...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::now_v7().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = new_id("entry");
        let b = new_id("entry");
        assert!(a.starts_with("entry_"));
        assert_ne!(a, b);
    }
}
