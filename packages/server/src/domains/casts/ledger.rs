//! Cast membership ledger.
//!
//! A (cast, profile) pair sits in any combination of four sets: managers,
//! members, pending member requests, and blocked. Every transition is a
//! guarded insert/remove decided by [`plan`], which looks only at the pair's
//! current [`Standing`]. The in-memory [`MembershipLedger`] and the Postgres
//! store (`models::membership`) both apply the same plan, so the rules live
//! in exactly one place.
//!
//! Invariants held by every successful sequence of operations:
//! - `members ∩ blocked = ∅`
//! - `member_requests ∩ blocked = ∅`
//! - `member_requests ∩ members = ∅`
//!
//! "At least one manager remains" and "you cannot remove yourself" are
//! checked by the caller before `remove_manager`; the ledger only checks
//! that the profile currently is a manager.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::ProfileId;

// ============================================================================
// Kinds and standing
// ============================================================================

/// One of the four relationships a profile can hold with a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Manager,
    Member,
    Requested,
    Blocked,
}

impl MembershipKind {
    pub const ALL: [MembershipKind; 4] = [
        MembershipKind::Manager,
        MembershipKind::Member,
        MembershipKind::Requested,
        MembershipKind::Blocked,
    ];
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipKind::Manager => write!(f, "manager"),
            MembershipKind::Member => write!(f, "member"),
            MembershipKind::Requested => write!(f, "requested"),
            MembershipKind::Blocked => write!(f, "blocked"),
        }
    }
}

/// Which of the four sets currently contain a (cast, profile) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Standing {
    pub manager: bool,
    pub member: bool,
    pub requested: bool,
    pub blocked: bool,
}

impl Standing {
    pub fn from_kinds(kinds: impl IntoIterator<Item = MembershipKind>) -> Self {
        let mut standing = Self::default();
        for kind in kinds {
            standing.set(kind, true);
        }
        standing
    }

    pub fn has(&self, kind: MembershipKind) -> bool {
        match kind {
            MembershipKind::Manager => self.manager,
            MembershipKind::Member => self.member,
            MembershipKind::Requested => self.requested,
            MembershipKind::Blocked => self.blocked,
        }
    }

    fn set(&mut self, kind: MembershipKind, value: bool) {
        match kind {
            MembershipKind::Manager => self.manager = value,
            MembershipKind::Member => self.member = value,
            MembershipKind::Requested => self.requested = value,
            MembershipKind::Blocked => self.blocked = value,
        }
    }

    pub fn apply(&mut self, changes: &[Change]) {
        for change in changes {
            match *change {
                Change::Insert(kind) => self.set(kind, true),
                Change::Delete(kind) => self.set(kind, false),
            }
        }
    }
}

// ============================================================================
// Operations and their plans
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    AddManager,
    RemoveManager,
    AddMemberRequest,
    RemoveMemberRequest,
    AddMember,
    RemoveMember,
    BlockUser,
    UnblockUser,
}

impl LedgerOp {
    pub const ALL: [LedgerOp; 8] = [
        LedgerOp::AddManager,
        LedgerOp::RemoveManager,
        LedgerOp::AddMemberRequest,
        LedgerOp::RemoveMemberRequest,
        LedgerOp::AddMember,
        LedgerOp::RemoveMember,
        LedgerOp::BlockUser,
        LedgerOp::UnblockUser,
    ];
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedgerOp::AddManager => "add_manager",
            LedgerOp::RemoveManager => "remove_manager",
            LedgerOp::AddMemberRequest => "add_member_request",
            LedgerOp::RemoveMemberRequest => "remove_member_request",
            LedgerOp::AddMember => "add_member",
            LedgerOp::RemoveMember => "remove_member",
            LedgerOp::BlockUser => "block_user",
            LedgerOp::UnblockUser => "unblock_user",
        };
        f.write_str(name)
    }
}

/// A single set mutation produced by [`plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Insert(MembershipKind),
    Delete(MembershipKind),
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Refusal {
    AlreadyManager,
    ManagerMustBeMember,
    NotManager,
    AlreadyMember,
    AlreadyRequested,
    Blocked,
    NotRequested,
    StillManager,
    NotMember,
    NotBlocked,
}

impl Refusal {
    pub(crate) fn describe(&self, profile: &str, cast: &str) -> String {
        match self {
            Refusal::AlreadyManager => format!("{} is already a manager of {}", profile, cast),
            Refusal::ManagerMustBeMember => format!(
                "{} must be a member of {} before becoming a manager",
                profile, cast
            ),
            Refusal::NotManager => format!("{} is not a manager of {}", profile, cast),
            Refusal::AlreadyMember => format!("{} is already a member of {}", profile, cast),
            Refusal::AlreadyRequested => {
                format!("{} has already requested to join {}", profile, cast)
            }
            Refusal::Blocked => format!("{} has been blocked from {}", profile, cast),
            Refusal::NotRequested => format!("{} has not requested to join {}", profile, cast),
            Refusal::StillManager => format!(
                "{} is a manager of {} and must be removed as a manager first",
                profile, cast
            ),
            Refusal::NotMember => format!("{} is not a member of {}", profile, cast),
            Refusal::NotBlocked => format!("{} is not blocked from {}", profile, cast),
        }
    }
}

/// Decide what `op` does to a pair with the given standing.
///
/// Returns the set mutations to perform, or the refusal when a precondition
/// fails. An empty plan is a successful no-op (re-blocking a blocked profile).
pub fn plan(op: LedgerOp, standing: &Standing) -> Result<Vec<Change>, Refusal> {
    use MembershipKind::*;

    match op {
        LedgerOp::AddManager => {
            if standing.manager {
                return Err(Refusal::AlreadyManager);
            }
            if !standing.member {
                return Err(Refusal::ManagerMustBeMember);
            }
            Ok(vec![Change::Insert(Manager)])
        }
        LedgerOp::RemoveManager => {
            if !standing.manager {
                return Err(Refusal::NotManager);
            }
            Ok(vec![Change::Delete(Manager)])
        }
        LedgerOp::AddMemberRequest => {
            if standing.member {
                return Err(Refusal::AlreadyMember);
            }
            if standing.requested {
                return Err(Refusal::AlreadyRequested);
            }
            if standing.blocked {
                return Err(Refusal::Blocked);
            }
            Ok(vec![Change::Insert(Requested)])
        }
        LedgerOp::RemoveMemberRequest => {
            if !standing.requested {
                return Err(Refusal::NotRequested);
            }
            Ok(vec![Change::Delete(Requested)])
        }
        LedgerOp::AddMember => {
            if standing.member {
                return Err(Refusal::AlreadyMember);
            }
            if standing.blocked {
                return Err(Refusal::Blocked);
            }
            let mut changes = Vec::with_capacity(2);
            if standing.requested {
                changes.push(Change::Delete(Requested));
            }
            changes.push(Change::Insert(Member));
            Ok(changes)
        }
        LedgerOp::RemoveMember => {
            if standing.manager {
                return Err(Refusal::StillManager);
            }
            if !standing.member {
                return Err(Refusal::NotMember);
            }
            Ok(vec![Change::Delete(Member)])
        }
        LedgerOp::BlockUser => {
            let mut changes = Vec::with_capacity(3);
            if standing.member {
                changes.push(Change::Delete(Member));
            }
            if standing.requested {
                changes.push(Change::Delete(Requested));
            }
            if !standing.blocked {
                changes.push(Change::Insert(Blocked));
            }
            Ok(changes)
        }
        LedgerOp::UnblockUser => {
            if !standing.blocked {
                return Err(Refusal::NotBlocked);
            }
            Ok(vec![Change::Delete(Blocked)])
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A refused ledger operation, naming the profile and cast involved.
///
/// `Display` is the user-facing notice text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .refusal.describe(.profile, .cast))]
pub struct MembershipError {
    pub op: LedgerOp,
    pub refusal: Refusal,
    pub profile: String,
    pub cast: String,
}

impl MembershipError {
    pub fn new(op: LedgerOp, refusal: Refusal, profile: &str, cast: &str) -> Self {
        Self {
            op,
            refusal,
            profile: profile.to_string(),
            cast: cast.to_string(),
        }
    }
}

// ============================================================================
// Subjects
// ============================================================================

/// Anything that can stand in a cast's ledger: an id plus a display name for
/// error messages.
pub trait Subject {
    fn profile_id(&self) -> ProfileId;
    fn display_name(&self) -> String;
}

// ============================================================================
// In-memory ledger
// ============================================================================

/// The four membership sets of a single cast, held in memory.
#[derive(Debug, Clone, Default)]
pub struct MembershipLedger {
    cast_name: String,
    managers: HashSet<ProfileId>,
    members: HashSet<ProfileId>,
    member_requests: HashSet<ProfileId>,
    blocked: HashSet<ProfileId>,
}

impl MembershipLedger {
    pub fn new(cast_name: impl Into<String>) -> Self {
        Self {
            cast_name: cast_name.into(),
            ..Default::default()
        }
    }

    /// A cast as it exists right after creation: the founder is both member
    /// and manager.
    pub fn founded_by(cast_name: impl Into<String>, founder: &impl Subject) -> Self {
        let mut ledger = Self::new(cast_name);
        ledger.members.insert(founder.profile_id());
        ledger.managers.insert(founder.profile_id());
        ledger
    }

    /// Rebuild a ledger from stored relationship rows.
    pub fn from_rows(
        cast_name: impl Into<String>,
        rows: impl IntoIterator<Item = (ProfileId, MembershipKind)>,
    ) -> Self {
        let mut ledger = Self::new(cast_name);
        for (profile_id, kind) in rows {
            ledger.set_mut(kind).insert(profile_id);
        }
        ledger
    }

    pub fn cast_name(&self) -> &str {
        &self.cast_name
    }

    pub fn managers(&self) -> &HashSet<ProfileId> {
        &self.managers
    }

    pub fn members(&self) -> &HashSet<ProfileId> {
        &self.members
    }

    pub fn member_requests(&self) -> &HashSet<ProfileId> {
        &self.member_requests
    }

    pub fn blocked(&self) -> &HashSet<ProfileId> {
        &self.blocked
    }

    pub fn standing(&self, profile_id: ProfileId) -> Standing {
        Standing {
            manager: self.managers.contains(&profile_id),
            member: self.members.contains(&profile_id),
            requested: self.member_requests.contains(&profile_id),
            blocked: self.blocked.contains(&profile_id),
        }
    }

    fn set_mut(&mut self, kind: MembershipKind) -> &mut HashSet<ProfileId> {
        match kind {
            MembershipKind::Manager => &mut self.managers,
            MembershipKind::Member => &mut self.members,
            MembershipKind::Requested => &mut self.member_requests,
            MembershipKind::Blocked => &mut self.blocked,
        }
    }

    /// Run one operation. On refusal the ledger is left untouched.
    pub fn apply(&mut self, op: LedgerOp, profile: &impl Subject) -> Result<(), MembershipError> {
        let profile_id = profile.profile_id();
        let changes = plan(op, &self.standing(profile_id)).map_err(|refusal| {
            MembershipError::new(op, refusal, &profile.display_name(), &self.cast_name)
        })?;

        for change in changes {
            match change {
                Change::Insert(kind) => self.set_mut(kind).insert(profile_id),
                Change::Delete(kind) => self.set_mut(kind).remove(&profile_id),
            };
        }
        Ok(())
    }

    pub fn add_manager(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::AddManager, profile)
    }

    pub fn remove_manager(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::RemoveManager, profile)
    }

    pub fn add_member_request(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::AddMemberRequest, profile)
    }

    pub fn remove_member_request(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::RemoveMemberRequest, profile)
    }

    pub fn add_member(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::AddMember, profile)
    }

    pub fn remove_member(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::RemoveMember, profile)
    }

    pub fn block_user(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::BlockUser, profile)
    }

    pub fn unblock_user(&mut self, profile: &impl Subject) -> Result<(), MembershipError> {
        self.apply(LedgerOp::UnblockUser, profile)
    }

    /// True when members, requests and blocked are pairwise disjoint.
    pub fn is_consistent(&self) -> bool {
        self.members.is_disjoint(&self.blocked)
            && self.member_requests.is_disjoint(&self.blocked)
            && self.member_requests.is_disjoint(&self.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Person {
        id: ProfileId,
        name: &'static str,
    }

    impl Person {
        fn new(name: &'static str) -> Self {
            Self {
                id: ProfileId::new(),
                name,
            }
        }
    }

    impl Subject for Person {
        fn profile_id(&self) -> ProfileId {
            self.id
        }

        fn display_name(&self) -> String {
            self.name.to_string()
        }
    }

    fn all_standings() -> Vec<Standing> {
        (0..16u8)
            .map(|bits| Standing {
                manager: bits & 1 != 0,
                member: bits & 2 != 0,
                requested: bits & 4 != 0,
                blocked: bits & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn test_add_member_then_duplicate_fails() {
        let mut ledger = MembershipLedger::new("Midnight Players");
        let janet = Person::new("Janet Weiss");

        ledger.add_member(&janet).unwrap();
        assert!(ledger.members().contains(&janet.id));

        let err = ledger.add_member(&janet).unwrap_err();
        assert_eq!(err.refusal, Refusal::AlreadyMember);
        assert_eq!(err.to_string(), "Janet Weiss is already a member of Midnight Players");
    }

    #[test]
    fn test_membership_error_is_a_std_error() {
        let err = MembershipError::new(
            LedgerOp::RemoveMemberRequest,
            Refusal::NotRequested,
            "Rocky Horror",
            "Midnight Players",
        );
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert_eq!(
            boxed.to_string(),
            "Rocky Horror has not requested to join Midnight Players"
        );
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_add_manager_requires_membership() {
        let mut ledger = MembershipLedger::new("Midnight Players");
        let brad = Person::new("Brad Majors");

        let err = ledger.add_manager(&brad).unwrap_err();
        assert_eq!(err.refusal, Refusal::ManagerMustBeMember);
        assert!(ledger.managers().is_empty());

        ledger.add_member(&brad).unwrap();
        ledger.add_manager(&brad).unwrap();
        assert!(ledger.managers().contains(&brad.id));

        let again = ledger.add_manager(&brad).unwrap_err();
        assert_eq!(again.refusal, Refusal::AlreadyManager);
    }

    #[test]
    fn test_founding_scenario_and_approval() {
        let founder = Person::new("Frank N. Furter");
        let mut ledger = MembershipLedger::founded_by("Midnight Players", &founder);
        assert!(ledger.managers().contains(&founder.id));
        assert!(ledger.members().contains(&founder.id));

        let rocky = Person::new("Rocky");
        ledger.add_member_request(&rocky).unwrap();
        assert!(ledger.member_requests().contains(&rocky.id));

        ledger.remove_member_request(&rocky).unwrap();
        ledger.add_member(&rocky).unwrap();
        assert!(ledger.members().contains(&rocky.id));
        assert!(!ledger.member_requests().contains(&rocky.id));
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_blocked_profile_cannot_request() {
        let mut ledger = MembershipLedger::new("Midnight Players");
        let riff = Person::new("Riff Raff");

        ledger.block_user(&riff).unwrap();
        let err = ledger.add_member_request(&riff).unwrap_err();
        assert_eq!(err.refusal, Refusal::Blocked);
        assert!(err.to_string().contains("blocked"));
        assert!(ledger.member_requests().is_empty());
    }

    #[test]
    fn test_block_converges_from_any_start() {
        let member = Person::new("Columbia");
        let requester = Person::new("Magenta");
        let stranger = Person::new("Eddie");

        let mut ledger = MembershipLedger::new("Midnight Players");
        ledger.add_member(&member).unwrap();
        ledger.add_member_request(&requester).unwrap();

        for person in [&member, &requester, &stranger] {
            ledger.block_user(person).unwrap();
            // A second block is a no-op, not an error
            ledger.block_user(person).unwrap();

            let standing = ledger.standing(person.id);
            assert!(standing.blocked);
            assert!(!standing.member);
            assert!(!standing.requested);
        }
        assert!(ledger.is_consistent());
    }

    #[test]
    fn test_request_round_trip_leaves_no_residue() {
        let founder = Person::new("Frank N. Furter");
        let mut ledger = MembershipLedger::founded_by("Midnight Players", &founder);
        let before = ledger.clone();
        let rocky = Person::new("Rocky");

        ledger.add_member_request(&rocky).unwrap();
        ledger.remove_member_request(&rocky).unwrap();

        assert_eq!(ledger.managers(), before.managers());
        assert_eq!(ledger.members(), before.members());
        assert_eq!(ledger.member_requests(), before.member_requests());
        assert_eq!(ledger.blocked(), before.blocked());
    }

    #[test]
    fn test_remove_manager_has_no_opinion_on_count() {
        let founder = Person::new("Frank N. Furter");
        let mut ledger = MembershipLedger::founded_by("Midnight Players", &founder);

        // Last manager: the ledger still allows it. The caller guards the count.
        ledger.remove_manager(&founder).unwrap();
        assert!(ledger.managers().is_empty());

        let err = ledger.remove_manager(&founder).unwrap_err();
        assert_eq!(err.refusal, Refusal::NotManager);
    }

    #[test]
    fn test_manager_must_step_down_before_leaving() {
        let founder = Person::new("Frank N. Furter");
        let mut ledger = MembershipLedger::founded_by("Midnight Players", &founder);

        let err = ledger.remove_member(&founder).unwrap_err();
        assert_eq!(err.refusal, Refusal::StillManager);

        ledger.remove_manager(&founder).unwrap();
        ledger.remove_member(&founder).unwrap();
        assert!(ledger.members().is_empty());
    }

    #[test]
    fn test_add_member_clears_pending_request() {
        let mut ledger = MembershipLedger::new("Midnight Players");
        let rocky = Person::new("Rocky");

        ledger.add_member_request(&rocky).unwrap();
        ledger.add_member(&rocky).unwrap();
        assert_eq!(
            ledger.standing(rocky.id),
            Standing {
                member: true,
                ..Standing::default()
            }
        );
    }

    #[test]
    fn test_unblock_requires_block() {
        let mut ledger = MembershipLedger::new("Midnight Players");
        let eddie = Person::new("Eddie");

        let err = ledger.unblock_user(&eddie).unwrap_err();
        assert_eq!(err.refusal, Refusal::NotBlocked);

        ledger.block_user(&eddie).unwrap();
        ledger.unblock_user(&eddie).unwrap();
        assert_eq!(ledger.standing(eddie.id), Standing::default());
        ledger.add_member_request(&eddie).unwrap();
    }

    #[test]
    fn test_refusal_leaves_ledger_unchanged() {
        let person = Person::new("Janet");

        for standing in all_standings() {
            let rows = MembershipKind::ALL
                .into_iter()
                .filter(|kind| standing.has(*kind))
                .map(|kind| (person.id, kind));
            let ledger = MembershipLedger::from_rows("Midnight Players", rows);

            for op in LedgerOp::ALL {
                let mut attempt = ledger.clone();
                if attempt.apply(op, &person).is_err() {
                    assert_eq!(attempt.standing(person.id), standing, "{} mutated on refusal", op);
                }
            }
        }
    }

    #[test]
    fn test_plans_never_create_overlaps_from_consistent_standing() {
        let consistent = |s: &Standing| {
            !(s.member && s.blocked) && !(s.requested && s.blocked) && !(s.requested && s.member)
        };

        for standing in all_standings().into_iter().filter(consistent) {
            for op in LedgerOp::ALL {
                if let Ok(changes) = plan(op, &standing) {
                    let mut after = standing;
                    after.apply(&changes);
                    assert!(
                        consistent(&after),
                        "{} from {:?} produced {:?}",
                        op,
                        standing,
                        after
                    );
                }
            }
        }
    }

    #[test]
    fn test_random_walks_stay_consistent() {
        let people: Vec<Person> = ["Janet", "Brad", "Rocky", "Eddie"]
            .into_iter()
            .map(Person::new)
            .collect();
        let mut ledger = MembershipLedger::founded_by("Midnight Players", &people[0]);

        // Deterministic walk through every (op, person) combination, several rounds
        let mut step: usize = 7;
        for _ in 0..400 {
            step = step.wrapping_mul(31).wrapping_add(17) % 1009;
            let op = LedgerOp::ALL[step % LedgerOp::ALL.len()];
            let person = &people[(step / LedgerOp::ALL.len()) % people.len()];
            let _ = ledger.apply(op, person);
            assert!(ledger.is_consistent(), "{} on {} broke the ledger", op, person.name);
        }
    }

    #[test]
    fn test_from_rows_rebuilds_sets() {
        let a = ProfileId::new();
        let b = ProfileId::new();
        let ledger = MembershipLedger::from_rows(
            "Midnight Players",
            vec![
                (a, MembershipKind::Manager),
                (a, MembershipKind::Member),
                (b, MembershipKind::Requested),
            ],
        );
        assert_eq!(
            ledger.standing(a),
            Standing {
                manager: true,
                member: true,
                ..Standing::default()
            }
        );
        assert!(ledger.standing(b).requested);
        assert_eq!(ledger.cast_name(), "Midnight Players");
    }
}
