#![no_main]
use iam_policy::iam::{MaskedIp, MatchMode, PatternMatcher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, String)| {
    let (pattern, text) = input;

    // Folding must agree with matching the uppercased strings
    assert_eq!(
        PatternMatcher::matches(&pattern, &text, true),
        PatternMatcher::matches(&pattern.to_ascii_uppercase(), &text.to_ascii_uppercase(), false)
    );

    let _ = PatternMatcher::match_policy(&pattern, &text, MatchMode::Action);

    if let (Some(a), Some(b)) = (MaskedIp::parse(&pattern), MaskedIp::parse(&text)) {
        assert_eq!(a.matches(&b), b.matches(&a));
    }
});
