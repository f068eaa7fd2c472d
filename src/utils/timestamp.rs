use jiff::Zoned;

/// Local wall-clock time with millisecond precision, e.g.
/// `2024-05-01 13:45:12.042`. Used in console lines and the error log.
pub fn timestamp() -> String {
    Zoned::now().strftime("%Y-%m-%d %H:%M:%S.%3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), "2024-05-01 13:45:12.042".len(), "got {ts}");
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[19..20], ".");
        assert!(ts[20..].chars().all(|c| c.is_ascii_digit()));
    }
}
