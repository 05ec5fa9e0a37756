/// Line terminator of the current platform.
#[cfg(target_os = "windows")]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(target_os = "windows"))]
pub const LINE_ENDING: &str = "\n";

/// String utility functions shared by the command encoders.
pub struct StringUtil;

impl StringUtil {
    /// True when `value` contains neither a carriage return nor a line feed.
    pub fn is_single_line(value: &str) -> bool {
        !value.contains(['\r', '\n'])
    }

    /// Split on `\n` or `\r\n`. A trailing terminator yields a trailing empty
    /// segment, so `"a\n"` splits into `["a", ""]`.
    pub fn split_lines(value: &str) -> Vec<&str> {
        value
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }

    /// Replace every `\n`, `\r\n` and lone `\r` with [`LINE_ENDING`].
    ///
    /// A lone `\r` counts as a line break, the same as in
    /// [`is_single_line`](Self::is_single_line).
    pub fn normalize_line_endings(value: &str) -> String {
        value
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .split('\n')
            .collect::<Vec<_>>()
            .join(LINE_ENDING)
    }

    /// Convert a string to a boolean.
    ///
    /// Only `true`/`True`/`TRUE` and `false`/`False`/`FALSE` are accepted,
    /// matching the YAML 1.2 core schema booleans the workflow syntax uses.
    /// Returns `None` for anything else.
    pub fn convert_to_bool(value: &str) -> Option<bool> {
        match value {
            "true" | "True" | "TRUE" => Some(true),
            "false" | "False" | "FALSE" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_detection() {
        assert!(StringUtil::is_single_line("hello world"));
        assert!(StringUtil::is_single_line(""));
        assert!(!StringUtil::is_single_line("a\nb"));
        assert!(!StringUtil::is_single_line("a\rb"));
    }

    #[test]
    fn split_lines_handles_both_terminators() {
        assert_eq!(StringUtil::split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(StringUtil::split_lines("a\n"), vec!["a", ""]);
        assert_eq!(StringUtil::split_lines(""), vec![""]);
    }

    #[test]
    fn normalize_line_endings_uses_platform_terminator() {
        let expected = format!("a{LINE_ENDING}b{LINE_ENDING}c");
        assert_eq!(StringUtil::normalize_line_endings("a\r\nb\nc"), expected);
        let expected = format!("a{LINE_ENDING}b{LINE_ENDING}");
        assert_eq!(StringUtil::normalize_line_endings("a\rb\r"), expected);
    }

    #[test]
    fn convert_to_bool_values() {
        assert_eq!(StringUtil::convert_to_bool("true"), Some(true));
        assert_eq!(StringUtil::convert_to_bool("True"), Some(true));
        assert_eq!(StringUtil::convert_to_bool("TRUE"), Some(true));
        assert_eq!(StringUtil::convert_to_bool("false"), Some(false));
        assert_eq!(StringUtil::convert_to_bool("FALSE"), Some(false));
        assert_eq!(StringUtil::convert_to_bool("tRUE"), None);
        assert_eq!(StringUtil::convert_to_bool("1"), None);
        assert_eq!(StringUtil::convert_to_bool(""), None);
    }
}
