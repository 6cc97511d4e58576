#![no_main]
use arbitrary::Arbitrary;
use iam_policy::iam::{Action, Arn, Effect, Environment, Policy, Principal};
use libfuzzer_sys::fuzz_target;

const POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [
        {"Effect": "Allow", "Action": ["s3:Get*", "s3:List*"], "Resource": "arn:aws:s3:::b/*",
         "Condition": {"IpAddress": {"aws:SourceIp": ["10.0.0.0/8", "::1"]}}},
        {"Effect": "Deny", "Action": "*", "Resource": "*",
         "Condition": {"NotIpAddress": {"aws:SourceIp": "10.0.0.0/8"},
                       "DateLessThanIfExists": {"aws:CurrentTime": "2020-01-01"}}},
        {"Effect": "Allow", "NotAction": "iam:*", "Resource": "*",
         "Principal": {"AWS": "arn:aws:iam::fuzz:user/admin"}}
    ]
}"#;

#[derive(Debug, Arbitrary)]
struct Request {
    action: u8,
    resource: String,
    source_ip: Option<String>,
    current_time: Option<String>,
    caller: Option<String>,
}

// Evaluation is total: any request yields one of the three effects
fuzz_target!(|req: Request| {
    let Ok(policy) = Policy::parse("fuzz", POLICY) else {
        return;
    };
    let Some(resource) = Arn::parse(&req.resource) else {
        return;
    };
    let action = Action::ALL[req.action as usize % Action::COUNT];

    let mut env = Environment::new();
    if let Some(ip) = req.source_ip {
        env.insert("aws:SourceIp", ip);
    }
    if let Some(time) = req.current_time {
        env.insert("aws:CurrentTime", time);
    }

    let caller = req.caller.as_deref().and_then(Principal::parse);
    let identity = caller.as_ref().map(|p| p as &dyn iam_policy::Identity);

    let effect = policy.eval(&env, identity, action, &resource);
    assert!(matches!(effect, Effect::Allow | Effect::Deny | Effect::Pass));
});
