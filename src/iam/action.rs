//! Action vocabulary
//!
//! Every recognized action has a stable index in one flat table spanning all
//! services. Each service also owns an `All` sentinel, set when a statement
//! grants every action of that service. [`ActionSet`] is a fixed-width bitset
//! over the table, so evaluation is a single bit test.

use super::pattern::{MatchMode, PatternMatcher};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Service that owns a block of actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionService {
    S3,
    Iam,
    Sts,
}

impl ActionService {
    /// Every service, in table order
    pub const ALL: [ActionService; 3] = [ActionService::S3, ActionService::Iam, ActionService::Sts];

    /// Prefix used in action names
    pub fn prefix(self) -> &'static str {
        match self {
            ActionService::S3 => "s3",
            ActionService::Iam => "iam",
            ActionService::Sts => "sts",
        }
    }

    /// The sentinel meaning "every action in this service"
    pub fn all_action(self) -> Action {
        match self {
            ActionService::S3 => Action::S3All,
            ActionService::Iam => Action::IamAll,
            ActionService::Sts => Action::StsAll,
        }
    }
}

macro_rules! action_table {
    ($($variant:ident => ($service:ident, $name:literal),)*) => {
        /// A recognized action
        ///
        /// The discriminant is the bit index in [`ActionSet`]. New actions are
        /// appended within their service block; indices are never reused.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Action {
            $($variant,)*
        }

        impl Action {
            /// Every action in index order
            pub const ALL: &'static [Action] = &[$(Action::$variant,)*];

            /// Wire name, e.g. `s3:GetObject`
            pub fn name(self) -> &'static str {
                match self {
                    $(Action::$variant => $name,)*
                }
            }

            /// Owning service
            pub fn service(self) -> ActionService {
                match self {
                    $(Action::$variant => ActionService::$service,)*
                }
            }
        }
    };
}

action_table! {
    S3GetObject => (S3, "s3:GetObject"),
    S3GetObjectVersion => (S3, "s3:GetObjectVersion"),
    S3PutObject => (S3, "s3:PutObject"),
    S3GetObjectAcl => (S3, "s3:GetObjectAcl"),
    S3GetObjectVersionAcl => (S3, "s3:GetObjectVersionAcl"),
    S3PutObjectAcl => (S3, "s3:PutObjectAcl"),
    S3PutObjectVersionAcl => (S3, "s3:PutObjectVersionAcl"),
    S3DeleteObject => (S3, "s3:DeleteObject"),
    S3DeleteObjectVersion => (S3, "s3:DeleteObjectVersion"),
    S3ListMultipartUploadParts => (S3, "s3:ListMultipartUploadParts"),
    S3AbortMultipartUpload => (S3, "s3:AbortMultipartUpload"),
    S3GetObjectTorrent => (S3, "s3:GetObjectTorrent"),
    S3GetObjectVersionTorrent => (S3, "s3:GetObjectVersionTorrent"),
    S3RestoreObject => (S3, "s3:RestoreObject"),
    S3CreateBucket => (S3, "s3:CreateBucket"),
    S3DeleteBucket => (S3, "s3:DeleteBucket"),
    S3ListBucket => (S3, "s3:ListBucket"),
    S3ListBucketVersions => (S3, "s3:ListBucketVersions"),
    S3ListAllMyBuckets => (S3, "s3:ListAllMyBuckets"),
    S3ListBucketMultipartUploads => (S3, "s3:ListBucketMultipartUploads"),
    S3GetAccelerateConfiguration => (S3, "s3:GetAccelerateConfiguration"),
    S3PutAccelerateConfiguration => (S3, "s3:PutAccelerateConfiguration"),
    S3GetBucketAcl => (S3, "s3:GetBucketAcl"),
    S3PutBucketAcl => (S3, "s3:PutBucketAcl"),
    S3GetBucketCors => (S3, "s3:GetBucketCORS"),
    S3PutBucketCors => (S3, "s3:PutBucketCORS"),
    S3GetBucketVersioning => (S3, "s3:GetBucketVersioning"),
    S3PutBucketVersioning => (S3, "s3:PutBucketVersioning"),
    S3GetBucketRequestPayment => (S3, "s3:GetBucketRequestPayment"),
    S3PutBucketRequestPayment => (S3, "s3:PutBucketRequestPayment"),
    S3GetBucketLocation => (S3, "s3:GetBucketLocation"),
    S3GetBucketPolicy => (S3, "s3:GetBucketPolicy"),
    S3DeleteBucketPolicy => (S3, "s3:DeleteBucketPolicy"),
    S3PutBucketPolicy => (S3, "s3:PutBucketPolicy"),
    S3GetBucketNotification => (S3, "s3:GetBucketNotification"),
    S3PutBucketNotification => (S3, "s3:PutBucketNotification"),
    S3GetBucketLogging => (S3, "s3:GetBucketLogging"),
    S3PutBucketLogging => (S3, "s3:PutBucketLogging"),
    S3GetBucketTagging => (S3, "s3:GetBucketTagging"),
    S3PutBucketTagging => (S3, "s3:PutBucketTagging"),
    S3GetBucketWebsite => (S3, "s3:GetBucketWebsite"),
    S3PutBucketWebsite => (S3, "s3:PutBucketWebsite"),
    S3DeleteBucketWebsite => (S3, "s3:DeleteBucketWebsite"),
    S3GetLifecycleConfiguration => (S3, "s3:GetLifecycleConfiguration"),
    S3PutLifecycleConfiguration => (S3, "s3:PutLifecycleConfiguration"),
    S3PutReplicationConfiguration => (S3, "s3:PutReplicationConfiguration"),
    S3GetReplicationConfiguration => (S3, "s3:GetReplicationConfiguration"),
    S3DeleteReplicationConfiguration => (S3, "s3:DeleteReplicationConfiguration"),
    S3GetObjectTagging => (S3, "s3:GetObjectTagging"),
    S3PutObjectTagging => (S3, "s3:PutObjectTagging"),
    S3DeleteObjectTagging => (S3, "s3:DeleteObjectTagging"),
    S3GetObjectVersionTagging => (S3, "s3:GetObjectVersionTagging"),
    S3PutObjectVersionTagging => (S3, "s3:PutObjectVersionTagging"),
    S3DeleteObjectVersionTagging => (S3, "s3:DeleteObjectVersionTagging"),
    S3All => (S3, "s3:*"),

    IamPutUserPolicy => (Iam, "iam:PutUserPolicy"),
    IamGetUserPolicy => (Iam, "iam:GetUserPolicy"),
    IamDeleteUserPolicy => (Iam, "iam:DeleteUserPolicy"),
    IamListUserPolicies => (Iam, "iam:ListUserPolicies"),
    IamCreateRole => (Iam, "iam:CreateRole"),
    IamDeleteRole => (Iam, "iam:DeleteRole"),
    IamModifyRole => (Iam, "iam:ModifyRole"),
    IamGetRole => (Iam, "iam:GetRole"),
    IamListRoles => (Iam, "iam:ListRoles"),
    IamPutRolePolicy => (Iam, "iam:PutRolePolicy"),
    IamGetRolePolicy => (Iam, "iam:GetRolePolicy"),
    IamListRolePolicies => (Iam, "iam:ListRolePolicies"),
    IamDeleteRolePolicy => (Iam, "iam:DeleteRolePolicy"),
    IamAll => (Iam, "iam:*"),

    StsAssumeRole => (Sts, "sts:AssumeRole"),
    StsAssumeRoleWithWebIdentity => (Sts, "sts:AssumeRoleWithWebIdentity"),
    StsGetSessionToken => (Sts, "sts:GetSessionToken"),
    StsAll => (Sts, "sts:*"),
}

impl Action {
    /// Number of entries in the table, sentinels included
    pub const COUNT: usize = Action::ALL.len();

    /// Bit index in [`ActionSet`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is a per-service `All` sentinel
    pub fn is_sentinel(self) -> bool {
        matches!(self, Action::S3All | Action::IamAll | Action::StsAll)
    }

    /// Exact lookup by wire name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const WORDS: usize = Action::COUNT.div_ceil(64);

/// Fixed-width bitset over [`Action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet {
    bits: [u64; WORDS],
}

impl ActionSet {
    /// The empty set
    pub const fn empty() -> Self {
        ActionSet { bits: [0; WORDS] }
    }

    /// Every action of every service, sentinels included
    pub fn all() -> Self {
        Action::ALL.iter().copied().collect()
    }

    /// Every action of one service, sentinel included
    pub fn service(service: ActionService) -> Self {
        Action::ALL
            .iter()
            .copied()
            .filter(|action| action.service() == service)
            .collect()
    }

    /// Resolve one action token from a policy document
    ///
    /// `*` selects everything. Otherwise the token is matched against each
    /// concrete action name with the colon-aware matcher, so `s3:Get*`
    /// selects every `s3:Get...` action. Returns `None` when nothing matches.
    pub fn resolve(token: &str) -> Option<Self> {
        if token == "*" {
            return Some(Self::all());
        }

        let mut set: ActionSet = Action::ALL
            .iter()
            .copied()
            .filter(|action| !action.is_sentinel())
            .filter(|action| PatternMatcher::match_policy(token, action.name(), MatchMode::Action))
            .collect();

        if set.is_empty() {
            return None;
        }
        set.fill_sentinels();
        Some(set)
    }

    /// Set each service's `All` bit when every concrete action of it is present
    pub fn fill_sentinels(&mut self) {
        for service in ActionService::ALL {
            let complete = Action::ALL
                .iter()
                .copied()
                .filter(|action| action.service() == service && !action.is_sentinel())
                .all(|action| self.contains(action));
            if complete {
                self.insert(service.all_action());
            }
        }
    }

    pub fn insert(&mut self, action: Action) {
        let idx = action.index();
        self.bits[idx / 64] |= 1 << (idx % 64);
    }

    pub fn remove(&mut self, action: Action) {
        let idx = action.index();
        self.bits[idx / 64] &= !(1 << (idx % 64));
    }

    pub fn contains(&self, action: Action) -> bool {
        let idx = action.index();
        self.bits[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Members in index order
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL
            .iter()
            .copied()
            .filter(move |action| self.contains(*action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::empty();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl BitOr for ActionSet {
    type Output = ActionSet;

    fn bitor(mut self, rhs: ActionSet) -> ActionSet {
        self |= rhs;
        self
    }
}

impl BitOrAssign for ActionSet {
    fn bitor_assign(&mut self, rhs: ActionSet) {
        for (lhs, rhs) in self.bits.iter_mut().zip(rhs.bits) {
            *lhs |= rhs;
        }
    }
}
