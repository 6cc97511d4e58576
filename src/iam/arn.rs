//! Amazon Resource Names
//!
//! `arn:<partition>:<service>:<region>:<account>:<resource>`
//!
//! Partition and service are closed sets with an explicit wildcard variant.
//! Region and account are matched per colon segment, case-insensitively.
//! The resource part may contain `/` and `:` and is matched case-sensitively.

use super::pattern::{MatchMode, PatternMatcher};
use crate::error::PolicyError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// ARN partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Aws,
    AwsCn,
    AwsUsGov,
    Wildcard,
}

impl Partition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "aws" => Some(Partition::Aws),
            "aws-cn" => Some(Partition::AwsCn),
            "aws-us-gov" => Some(Partition::AwsUsGov),
            "*" => Some(Partition::Wildcard),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Aws => "aws",
            Partition::AwsCn => "aws-cn",
            Partition::AwsUsGov => "aws-us-gov",
            Partition::Wildcard => "*",
        }
    }

    fn matches(self, other: Partition) -> bool {
        self == Partition::Wildcard || other == Partition::Wildcard || self == other
    }
}

macro_rules! service_table {
    ($($variant:ident => $name:literal,)*) => {
        /// ARN service namespace
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Service {
            $($variant,)*
            Wildcard,
        }

        impl Service {
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($name => Some(Service::$variant),)*
                    "*" => Some(Service::Wildcard),
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Service::$variant => $name,)*
                    Service::Wildcard => "*",
                }
            }
        }
    };
}

service_table! {
    ApiGateway => "apigateway",
    AutoScaling => "autoscaling",
    CloudFormation => "cloudformation",
    CloudFront => "cloudfront",
    CloudTrail => "cloudtrail",
    CloudWatch => "cloudwatch",
    DynamoDb => "dynamodb",
    Ec2 => "ec2",
    Ecr => "ecr",
    Ecs => "ecs",
    ElastiCache => "elasticache",
    Events => "events",
    Firehose => "firehose",
    Glacier => "glacier",
    Iam => "iam",
    Kinesis => "kinesis",
    Kms => "kms",
    Lambda => "lambda",
    Logs => "logs",
    Rds => "rds",
    Redshift => "redshift",
    Route53 => "route53",
    S3 => "s3",
    Sdb => "sdb",
    Ses => "ses",
    Sns => "sns",
    Sqs => "sqs",
    Ssm => "ssm",
    States => "states",
    Sts => "sts",
}

impl Service {
    fn matches(self, other: Service) -> bool {
        self == Service::Wildcard || other == Service::Wildcard || self == other
    }
}

fn arn_regex() -> &'static Regex {
    static ARN_RE: OnceLock<Regex> = OnceLock::new();
    ARN_RE.get_or_init(|| {
        Regex::new(r"^arn:([^:]*):([^:]*):([^:]*):([^:]*):(.*)$").expect("ARN pattern compiles")
    })
}

/// A resource identifier or resource pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn {
    pub partition: Partition,
    pub service: Service,
    pub region: String,
    pub account: String,
    pub resource: String,
}

impl Arn {
    pub fn new(
        partition: Partition,
        service: Service,
        region: impl Into<String>,
        account: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Arn {
            partition,
            service,
            region: region.into(),
            account: account.into(),
            resource: resource.into(),
        }
    }

    /// Parse an ARN or the bare `*` resource
    ///
    /// `*` becomes a pattern with wildcard partition, service, region and
    /// resource, and a blank account (which policy parsing fills with the
    /// owning tenant).
    ///
    /// # Examples
    /// ```
    /// use iam_policy::iam::{Arn, Partition, Service};
    ///
    /// let arn = Arn::parse("arn:aws:s3:::example_bucket").unwrap();
    /// assert_eq!(arn.partition, Partition::Aws);
    /// assert_eq!(arn.service, Service::S3);
    /// assert_eq!(arn.resource, "example_bucket");
    /// assert!(Arn::parse("arn:aws:s3").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        if s == "*" {
            return Some(Arn::new(
                Partition::Wildcard,
                Service::Wildcard,
                "*",
                "",
                "*",
            ));
        }

        let caps = arn_regex().captures(s)?;
        Some(Arn {
            partition: Partition::parse(&caps[1])?,
            service: Service::parse(&caps[2])?,
            region: caps[3].to_string(),
            account: caps[4].to_string(),
            resource: caps[5].to_string(),
        })
    }

    /// Check whether `candidate` falls under this pattern
    pub fn matches(&self, candidate: &Arn) -> bool {
        self.partition.matches(candidate.partition)
            && self.service.matches(candidate.service)
            && PatternMatcher::match_policy(&self.region, &candidate.region, MatchMode::Arn)
            && PatternMatcher::match_policy(&self.account, &candidate.account, MatchMode::Arn)
            && PatternMatcher::matches(&self.resource, &candidate.resource, false)
    }
}

impl FromStr for Arn {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arn::parse(s).ok_or_else(|| PolicyError::InvalidArn(s.to_string()))
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition.as_str(),
            self.service.as_str(),
            self.region,
            self.account,
            self.resource
        )
    }
}
