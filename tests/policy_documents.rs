//! Document parsing through the public API

use iam_policy::iam::{Action, Arn, ConditionOperator, Effect, Environment, Policy, Principal};
use iam_policy::{ParserConfig, PolicyError, PolicyParser};

fn wrap(statement: &str) -> String {
    format!(r#"{{"Version": "2012-10-17", "Statement": {}}}"#, statement)
}

#[test]
fn test_statement_object_or_array() {
    let single = Policy::parse("t", &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*"}"#)).unwrap();
    let array = Policy::parse("t", &wrap(r#"[{"Effect": "Allow", "Action": "*", "Resource": "*"}]"#)).unwrap();
    assert_eq!(single.statements(), array.statements());
}

#[test]
fn test_text_is_kept_verbatim() {
    let text = "\n  {\"Version\":\"2012-10-17\",\n\"Statement\":[]}  \n";
    let policy: Policy = text.parse().unwrap();
    assert_eq!(policy.text(), text);
}

fn assert_rejected(text: &str, expected: impl Fn(&PolicyError) -> bool) {
    let err = Policy::parse("t", text).unwrap_err();
    assert!(expected(&err), "unexpected error {:?} for {}", err, text);
}

#[test]
fn test_rejections() {
    assert_rejected("not json", |e| matches!(e, PolicyError::Json(_)));
    assert_rejected(r#"{"Statement": []}"#, |e| matches!(e, PolicyError::MissingVersion));
    assert_rejected(r#"{"Version": "2012-10-18", "Statement": []}"#, |e| {
        matches!(e, PolicyError::UnsupportedVersion(_))
    });
    assert_rejected(r#"{"Version": "2012-10-17", "Statement": [], "Extra": 1}"#, |e| {
        matches!(e, PolicyError::Json(_))
    });
    assert_rejected(&wrap(r#"{"Effect": "Pass", "Action": "*", "Resource": "*"}"#), |e| {
        matches!(e, PolicyError::InvalidEffect(_))
    });
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "ec2:RunInstances", "Resource": "*"}"#),
        |e| matches!(e, PolicyError::InvalidAction(_)),
    );
    assert_rejected(&wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "bucket"}"#), |e| {
        matches!(e, PolicyError::InvalidArn(_))
    });
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*", "NotResource": "*"}"#),
        |e| matches!(e, PolicyError::ConflictingElements("Resource", "NotResource")),
    );
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*", "Principal": "*", "NotPrincipal": "*"}"#),
        |e| matches!(e, PolicyError::ConflictingElements("Principal", "NotPrincipal")),
    );
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*", "Principal": {"AWS": "arn:aws:iam::a:group/g"}}"#),
        |e| matches!(e, PolicyError::InvalidPrincipal(_)),
    );
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*", "Condition": {"IpRange": {"k": "v"}}}"#),
        |e| matches!(e, PolicyError::UnknownConditionOperator(_)),
    );
    assert_rejected(
        &wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*", "Condition": {"NullIfExists": {"k": "true"}}}"#),
        |e| matches!(e, PolicyError::UnknownConditionOperator(_)),
    );
}

#[test]
fn test_size_limit() {
    let text = wrap(r#"{"Effect": "Allow", "Action": "*", "Resource": "*"}"#);

    let err = PolicyParser::new().max_document_size(text.len() - 1).parse(&text).unwrap_err();
    assert!(matches!(err, PolicyError::DocumentTooLarge { .. }));
    assert!(PolicyParser::new().max_document_size(text.len()).parse(&text).is_ok());

    let padded = format!("{}{}", text, " ".repeat(20 * 1024));
    assert!(matches!(
        Policy::parse("t", &padded).unwrap_err(),
        PolicyError::DocumentTooLarge { limit: 20480, .. }
    ));
}

#[test]
fn test_config_from_toml() {
    let config = ParserConfig::from_toml_str(
        r#"
        tenant = "ACCOUNT"
        max_document_size = 4096
        "#,
    )
    .unwrap();
    let policy = PolicyParser::from_config(config)
        .parse(&wrap(r#"{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::b/*"}"#))
        .unwrap();

    assert_eq!(policy.statements()[0].resource[0].account, "ACCOUNT");
}

#[test]
fn test_lenient_principals() {
    let text = wrap(
        r#"{"Effect": "Allow", "Action": "*", "Resource": "*",
            "Principal": {"AWS": ["ACCOUNT", "arn:aws:iam::ACCOUNT:group/admins"]}}"#,
    );

    assert!(Policy::parse("t", &text).is_err());

    let policy = PolicyParser::new()
        .reject_invalid_principals(false)
        .parse(&text)
        .unwrap();
    let stmt = &policy.statements()[0];
    assert_eq!(stmt.principal.len(), 1);
    assert!(stmt.principal.contains(&Principal::tenant("ACCOUNT")));
}

#[test]
fn test_principal_variants() {
    let text = wrap(
        r#"{"Effect": "Allow", "Action": "sts:AssumeRole", "Resource": "*",
            "Principal": {"AWS": [
                "arn:aws:iam::acct:root",
                "arn:aws:iam::acct:user/alice",
                "arn:aws:iam::acct:role/builder"
            ]}}"#,
    );
    let policy = Policy::parse("acct", &text).unwrap();
    let env = Environment::new();
    let role = Arn::parse("arn:aws:iam::acct:role/builder").unwrap();

    for caller in [
        Principal::tenant("acct"),
        Principal::user("acct", "alice"),
        Principal::role("acct", "builder"),
    ] {
        assert_eq!(policy.eval(&env, Some(&caller), Action::StsAssumeRole, &role), Effect::Allow);
    }
    let bob = Principal::user("acct", "bob");
    assert_eq!(policy.eval(&env, Some(&bob), Action::StsAssumeRole, &role), Effect::Pass);
}

#[test]
fn test_condition_operator_table() {
    let text = wrap(
        r#"{"Effect": "Allow", "Action": "s3:ListBucket", "Resource": "*",
            "Condition": {
                "StringLike": {"s3:prefix": ["home/*", "shared/*"]},
                "NumericLessThanEquals": {"s3:max-keys": 100},
                "DateGreaterThan": {"aws:CurrentTime": "2020-01-01T00:00:00Z"},
                "Bool": {"aws:SecureTransport": true},
                "Null": {"aws:TokenIssueTime": "true"}
            }}"#,
    );
    let policy = Policy::parse("t", &text).unwrap();
    let ops: Vec<_> = policy.statements()[0].conditions.iter().map(|c| c.operator).collect();
    assert_eq!(
        ops,
        vec![
            ConditionOperator::StringLike,
            ConditionOperator::NumericLessThanEquals,
            ConditionOperator::DateGreaterThan,
            ConditionOperator::Bool,
            ConditionOperator::Null,
        ]
    );

    let bucket = Arn::parse("arn:aws:s3::t:b").unwrap();
    let env = Environment::new()
        .with("s3:prefix", "home/alice")
        .with("s3:max-keys", "50")
        .with("aws:CurrentTime", "2024-05-01T10:00:00Z")
        .with("aws:SecureTransport", "true");
    assert_eq!(policy.eval(&env, None, Action::S3ListBucket, &bucket), Effect::Allow);

    let temporary = env.clone().with("aws:TokenIssueTime", "2024-05-01T09:00:00Z");
    assert_eq!(policy.eval(&temporary, None, Action::S3ListBucket, &bucket), Effect::Pass);

    let too_many = env.clone().with("s3:max-keys", "1000");
    assert_eq!(policy.eval(&too_many, None, Action::S3ListBucket, &bucket), Effect::Pass);

    let elsewhere = env.with("s3:prefix", "private/x");
    assert_eq!(policy.eval(&elsewhere, None, Action::S3ListBucket, &bucket), Effect::Pass);
}

#[test]
fn test_has_conditional() {
    let text = wrap(
        r#"[{"Effect": "Allow", "Action": "*", "Resource": "*"},
            {"Effect": "Deny", "Action": "*", "Resource": "*",
             "Condition": {"StringNotEquals": {"aws:UserAgent": "trusted"}}}]"#,
    );
    let policy = Policy::parse("t", &text).unwrap();
    assert!(policy.has_conditional("aws:UserAgent"));
    assert!(!policy.has_conditional("aws:SourceIp"));
}

#[test]
fn test_repeated_condition_operator_still_gates() {
    let text = wrap(
        r#"{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*",
            "Condition": {
                "IpAddress": {"aws:SourceIp": "10.0.0.0/8"},
                "IpAddress": {"aws:SourceIp": "0.0.0.0/0"}
            }}"#,
    );
    let policy = Policy::parse("t", &text).unwrap();
    assert_eq!(policy.statements()[0].conditions.len(), 2);

    let object = Arn::parse("arn:aws:s3::t:b/k").unwrap();
    let outside = Environment::new().with("aws:SourceIp", "8.8.8.8");
    let inside = Environment::new().with("aws:SourceIp", "10.9.8.7");
    assert_eq!(policy.eval(&outside, None, Action::S3GetObject, &object), Effect::Pass);
    assert_eq!(policy.eval(&inside, None, Action::S3GetObject, &object), Effect::Allow);
}

#[test]
fn test_lenient_not_principal_does_not_widen_allow() {
    let text = wrap(
        r#"[{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*",
             "NotPrincipal": {"AWS": ["arn:aws:iam::t:group/blocked"]}}]"#,
    );
    let policy = PolicyParser::new()
        .reject_invalid_principals(false)
        .parse(&text)
        .unwrap();
    assert!(policy.statements().is_empty());

    let anyone = Principal::user("t", "mallory");
    let object = Arn::parse("arn:aws:s3::t:b/k").unwrap();
    assert_eq!(
        policy.eval(&Environment::new(), Some(&anyone), Action::S3GetObject, &object),
        Effect::Pass
    );
}
