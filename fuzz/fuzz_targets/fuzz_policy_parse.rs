#![no_main]
use iam_policy::iam::Policy;
use libfuzzer_sys::fuzz_target;

// Parsing arbitrary text returns an error or a policy that keeps the text
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(policy) = Policy::parse("fuzz", text) {
        assert_eq!(policy.text(), text);
    }
});
