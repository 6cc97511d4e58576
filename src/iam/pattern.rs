//! Wildcard matching for policy strings
//!
//! Supports wildcards:
//! - `?` - Matches exactly one character
//! - `*` - Matches zero or more characters
//!
//! Matching is a single left-to-right scan. After a `*` the matcher skips input
//! until the next pattern character matches and commits to that position; it
//! never revisits the choice. `a*c` therefore matches `abbc` but not `abcc`.

/// Which policy element is being matched. Fixes the case sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Action names (`s3:GetObject`), case-insensitive
    Action,
    /// Resource paths, case-sensitive
    Resource,
    /// ARN fields (region, account), case-insensitive
    Arn,
    /// Free-form strings, case-sensitive
    String,
}

impl MatchMode {
    /// Whether letters compare without regard to ASCII case in this mode
    pub fn case_insensitive(self) -> bool {
        matches!(self, MatchMode::Action | MatchMode::Arn)
    }
}

/// Pattern matcher for policy strings
pub struct PatternMatcher;

impl PatternMatcher {
    /// Check if `input` matches a `?`/`*` pattern
    ///
    /// # Examples
    /// ```
    /// use iam_policy::iam::PatternMatcher;
    ///
    /// assert!(PatternMatcher::matches("a*c", "abbc", false));
    /// assert!(PatternMatcher::matches("a?c", "ABC", true));
    /// assert!(!PatternMatcher::matches("a*c", "abcc", false));
    /// ```
    pub fn matches(pattern: &str, input: &str, case_insensitive: bool) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let input: Vec<char> = input.chars().collect();

        let char_matches = |p: char, c: char| {
            p == '?' || p == c || (case_insensitive && p.eq_ignore_ascii_case(&c))
        };

        let (mut pat_idx, mut in_idx) = (0, 0);
        loop {
            // Pattern exhausted - only a match if the input is too
            if pat_idx == pattern.len() {
                return in_idx == input.len();
            }

            if pattern[pat_idx] == '*' {
                // Trailing * swallows the rest
                if pat_idx + 1 == pattern.len() {
                    return true;
                }
                if in_idx == input.len() || char_matches(pattern[pat_idx + 1], input[in_idx]) {
                    pat_idx += 1;
                } else {
                    in_idx += 1;
                }
                continue;
            }

            if in_idx == input.len() {
                return false;
            }

            if char_matches(pattern[pat_idx], input[in_idx]) {
                pat_idx += 1;
                in_idx += 1;
                continue;
            }

            return false;
        }
    }

    /// Match colon-delimited strings segment by segment
    ///
    /// A `*` never reaches across a `:`, and both sides must have the same
    /// number of segments.
    ///
    /// # Examples
    /// ```
    /// use iam_policy::iam::{MatchMode, PatternMatcher};
    ///
    /// assert!(PatternMatcher::match_policy("s3:Get*", "s3:GetObject", MatchMode::Action));
    /// assert!(!PatternMatcher::match_policy("a:*", "a:b:c", MatchMode::Action));
    /// ```
    pub fn match_policy(pattern: &str, input: &str, mode: MatchMode) -> bool {
        let case_insensitive = mode.case_insensitive();
        let mut pattern_parts = pattern.split(':');
        let mut input_parts = input.split(':');

        loop {
            match (pattern_parts.next(), input_parts.next()) {
                (Some(pat_part), Some(in_part)) => {
                    if !Self::matches(pat_part, in_part, case_insensitive) {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(pattern: &str, input: &str) -> (bool, bool) {
        (
            PatternMatcher::matches(pattern, input, false),
            PatternMatcher::matches(pattern, input, true),
        )
    }

    #[test]
    fn test_simple() {
        assert_eq!(both("", ""), (true, true));
        assert_eq!(both("", "abc"), (false, false));
        assert_eq!(both("abc", ""), (false, false));
        assert_eq!(both("abc", "abc"), (true, true));
        assert_eq!(both("abc", "abC"), (false, true));
        assert_eq!(both("abC", "abc"), (false, true));
        assert_eq!(both("abc", "abcd"), (false, false));
        assert_eq!(both("abcd", "abc"), (false, false));
    }

    #[test]
    fn test_question_mark() {
        assert_eq!(both("?", ""), (false, false));
        assert_eq!(both("?", "a"), (true, true));
        assert_eq!(both("?bc", "abc"), (true, true));
        assert_eq!(both("a?c", "abc"), (true, true));
        // ? in the input is just a character
        assert_eq!(both("abc", "a?c"), (false, false));
        assert_eq!(both("a?c", "abC"), (false, true));
        assert_eq!(both("ab?", "abc"), (true, true));
        assert_eq!(both("a?c?e", "abcde"), (true, true));
        assert_eq!(both("???", "abc"), (true, true));
        assert_eq!(both("???", "abcd"), (false, false));
    }

    #[test]
    fn test_asterisk() {
        assert_eq!(both("*", ""), (true, true));
        assert_eq!(both("", "*"), (false, false));
        assert_eq!(both("*a", ""), (false, false));
        assert_eq!(both("*a", "a"), (true, true));
        assert_eq!(both("a*", "a"), (true, true));
        assert_eq!(both("a*c", "ac"), (true, true));
        assert_eq!(both("a*c", "abbc"), (true, true));
        assert_eq!(both("a*c", "abbC"), (false, true));
        assert_eq!(both("a*c*e", "abBce"), (true, true));
        assert_eq!(
            both("http://*.example.com", "http://www.example.com"),
            (true, true)
        );
        assert_eq!(
            both("http://*.example.com", "http://www.Example.com"),
            (false, true)
        );
        assert!(PatternMatcher::matches(
            "http://example.com/*",
            "http://example.com/index.html",
            false
        ));
        assert!(PatternMatcher::matches(
            "http://example.com/*/*.jpg",
            "http://example.com/fun/smiley.jpg",
            false
        ));
    }

    #[test]
    fn test_asterisk_commits_to_first_match() {
        // * stops at the first 'c' and the trailing 'c' is left over
        assert_eq!(both("a*c", "abcc"), (false, false));
        assert_eq!(both("mybucket/*", "mybucket/a/b/c"), (true, true));
    }

    #[test]
    fn test_question_mark_after_asterisk_is_any_char() {
        // The stop check after `*` treats a following `?` as a wildcard
        assert_eq!(both("*?", "a"), (true, true));
        assert_eq!(both("*?", ""), (false, false));
        assert_eq!(both("a*?c", "abc"), (true, true));
        // `*` stops at once, so `?` takes one char and `c` is left over
        assert_eq!(both("a*?", "abc"), (false, false));
    }

    #[test]
    fn test_match_policy_action() {
        let mode = MatchMode::Action;
        assert!(PatternMatcher::match_policy("a:b:c", "a:b:c", mode));
        assert!(PatternMatcher::match_policy("a:b:c", "A:B:C", mode));
        assert!(PatternMatcher::match_policy("a:*:e", "a:bcd:e", mode));
        assert!(!PatternMatcher::match_policy("a:*", "a:b:c", mode));
    }

    #[test]
    fn test_match_policy_resource() {
        let mode = MatchMode::Resource;
        assert!(PatternMatcher::match_policy("a:b:c", "a:b:c", mode));
        assert!(!PatternMatcher::match_policy("a:b:c", "A:B:C", mode));
        assert!(PatternMatcher::match_policy("a:*:e", "a:bcd:e", mode));
        assert!(!PatternMatcher::match_policy("a:*", "a:b:c", mode));
    }

    #[test]
    fn test_match_policy_arn() {
        let mode = MatchMode::Arn;
        assert!(PatternMatcher::match_policy("a:b:c", "a:b:c", mode));
        assert!(PatternMatcher::match_policy("a:b:c", "A:B:C", mode));
        assert!(PatternMatcher::match_policy("a:*:e", "a:bcd:e", mode));
        assert!(!PatternMatcher::match_policy("a:*", "a:b:c", mode));
    }

    #[test]
    fn test_match_policy_string() {
        let mode = MatchMode::String;
        assert!(PatternMatcher::match_policy("a:b:c", "a:b:c", mode));
        assert!(!PatternMatcher::match_policy("a:b:c", "A:B:C", mode));
        assert!(PatternMatcher::match_policy("a:*:e", "a:bcd:e", mode));
        assert!(!PatternMatcher::match_policy("a:*", "a:b:c", mode));
    }

    #[test]
    fn test_match_policy_blank_segments() {
        assert!(PatternMatcher::match_policy("", "", MatchMode::Arn));
        assert!(PatternMatcher::match_policy("*", "", MatchMode::Arn));
        assert!(!PatternMatcher::match_policy("tenant", "", MatchMode::Arn));
        assert!(!PatternMatcher::match_policy("a:b", "a", MatchMode::Arn));
    }
}
