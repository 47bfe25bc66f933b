/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Split a display name into `(first, last)` on the first space.
///
/// A single-word name yields an empty last name.
pub fn split_full_name(name: &str) -> (String, String) {
    let trimmed = name.trim();
    match trimmed.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("Ada Lovelace"),
            ("Ada".to_string(), "Lovelace".to_string())
        );
        assert_eq!(
            split_full_name("Jean Claude Van Damme"),
            ("Jean".to_string(), "Claude Van Damme".to_string())
        );
        assert_eq!(split_full_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(split_full_name("  "), (String::new(), String::new()));
    }

    #[test]
    fn test_now_millis_is_positive() {
        assert!(now_millis() > 1_700_000_000_000);
    }
}
