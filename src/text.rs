//! Substring-between-markers primitives.
//!
//! DiveMeets pages carry most of their data as rendered text with ad hoc
//! English labels rather than a stable DOM, so the parsers carve fields out
//! of concatenated text with these helpers. All three are pure and total:
//! a missing marker yields `None`, never an error.

/// The substring strictly between the first occurrence of `from` and the
/// first occurrence of `to` after it. `None` if either marker is absent or
/// `to` does not follow `from`.
pub fn slice_between<'a>(source: &'a str, from: &str, to: &str) -> Option<&'a str> {
    let start = source.find(from)? + from.len();
    let end = source[start..].find(to)? + start;
    Some(&source[start..end])
}

/// The remainder of `source` after the first occurrence of `from`.
pub fn slice_after<'a>(source: &'a str, from: &str) -> Option<&'a str> {
    let start = source.find(from)? + from.len();
    Some(&source[start..])
}

/// The prefix of `source` before the first occurrence of `to`.
pub fn slice_before<'a>(source: &'a str, to: &str) -> Option<&'a str> {
    let end = source.find(to)?;
    Some(&source[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_between() {
        assert_eq!(
            slice_between("Name: John State: CA", "Name: ", " State:"),
            Some("John")
        );
        assert_eq!(slice_between("a-b-c", "a-", "-c"), Some("b"));
        assert_eq!(slice_between("abc", "x", "c"), None);
        assert_eq!(slice_between("abc", "a", "x"), None);
    }

    #[test]
    fn test_slice_between_requires_order() {
        // `to` appears only before `from`, so there is no valid window.
        assert_eq!(slice_between("end start", "start", "end"), None);
        // A second `to` after `from` is found even when one precedes it.
        assert_eq!(slice_between("to from x to", "from ", " to"), Some("x"));
    }

    #[test]
    fn test_slice_between_empty_window() {
        assert_eq!(slice_between("fromto", "from", "to"), Some(""));
    }

    #[test]
    fn test_slice_after() {
        assert_eq!(slice_after("DiveMeets #: 12345", "DiveMeets #: "), Some("12345"));
        assert_eq!(slice_after("abc", "c"), Some(""));
        assert_eq!(slice_after("abc", "x"), None);
    }

    #[test]
    fn test_slice_before() {
        assert_eq!(slice_before("12345 remainder", " remainder"), Some("12345"));
        assert_eq!(slice_before("abc", "a"), Some(""));
        assert_eq!(slice_before("abc", "x"), None);
    }
}
