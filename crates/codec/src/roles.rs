//! Assigns input parts to the four choral roles.
//!
//! Two strategies run in order: declared-name keywords, then register
//! ordering for whatever the names could not settle.

use std::fmt;

use chorale_domain::{SourcePart, StaffId, StemDirection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pitched elements sampled when estimating a part's register.
const PITCH_CENTER_SAMPLE: usize = 200;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    #[serde(rename = "S")]
    Soprano,
    #[serde(rename = "A")]
    Alto,
    #[serde(rename = "T")]
    Tenor,
    #[serde(rename = "B")]
    Bass,
}

impl Role {
    /// Priority order used for both strategies.
    pub const ALL: [Role; 4] = [Role::Soprano, Role::Alto, Role::Tenor, Role::Bass];

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Role::Soprano => &["sopr", "sopran", "cantus", "discant"],
            Role::Alto => &["alto", "altus"],
            Role::Tenor => &["tenor", "ten.", "ten "],
            Role::Bass => &["bass", "basso", "bassus"],
        }
    }

    pub fn staff(self) -> StaffId {
        match self {
            Role::Soprano | Role::Alto => StaffId::Treble,
            Role::Tenor | Role::Bass => StaffId::Bass,
        }
    }

    pub fn direction(self) -> StemDirection {
        match self {
            Role::Soprano | Role::Tenor => StemDirection::Up,
            Role::Alto | Role::Bass => StemDirection::Down,
        }
    }

    /// Roles written on a staff, upper voice first.
    pub fn on_staff(staff: StaffId) -> [Role; 2] {
        match staff {
            StaffId::Treble => [Role::Soprano, Role::Alto],
            StaffId::Bass => [Role::Tenor, Role::Bass],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Soprano => "soprano",
            Role::Alto => "alto",
            Role::Tenor => "tenor",
            Role::Bass => "bass",
        };
        f.write_str(label)
    }
}

/// Which strategy settled an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Name,
    PitchCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// Index into the input part list.
    pub part: usize,
    pub strategy: Strategy,
}

/// At most one part per role. Missing roles stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMap {
    slots: [Option<Assignment>; 4],
}

impl RoleMap {
    pub fn get(&self, role: Role) -> Option<Assignment> {
        self.slots[role.index()]
    }

    pub fn part(&self, role: Role) -> Option<usize> {
        self.get(role).map(|a| a.part)
    }

    pub fn is_claimed(&self, role: Role) -> bool {
        self.slots[role.index()].is_some()
    }

    fn claim(&mut self, role: Role, part: usize, strategy: Strategy) {
        self.slots[role.index()] = Some(Assignment { part, strategy });
    }

    pub fn unclaimed(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| !self.is_claimed(*r))
    }

    pub fn assigned_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// Case-insensitive keyword match; the first role in priority order wins.
pub fn role_from_name(name: &str) -> Option<Role> {
    let lowered = name.to_lowercase();
    Role::ALL
        .into_iter()
        .find(|role| role.keywords().iter().any(|k| lowered.contains(k)))
}

/// Mean pitch number of the first pitched elements of a part, chords
/// reduced to their lowest member. A part with no pitches centres at 0.
pub fn pitch_center(part: &SourcePart) -> f64 {
    let pitches: Vec<i32> = part
        .pitched_elements()
        .take(PITCH_CENTER_SAMPLE)
        .filter_map(|el| el.register_pitch())
        .collect();
    if pitches.is_empty() {
        return 0.0;
    }
    pitches.iter().map(|&p| p as f64).sum::<f64>() / pitches.len() as f64
}

#[derive(Default)]
pub struct RoleClassifier;

impl RoleClassifier {
    pub fn classify(&self, parts: &[SourcePart]) -> RoleMap {
        let mut roles = RoleMap::default();
        let leftovers = self.assign_by_name(parts, &mut roles);
        self.assign_by_pitch_center(parts, &leftovers, &mut roles);
        roles
    }

    /// Claims roles for parts whose names say what they are. Returns the
    /// parts left over: unnamed, unrecognised, or naming a role already taken.
    pub fn assign_by_name(&self, parts: &[SourcePart], roles: &mut RoleMap) -> Vec<usize> {
        let mut leftovers = Vec::new();
        for (index, part) in parts.iter().enumerate() {
            match part.declared_name().and_then(role_from_name) {
                Some(role) if !roles.is_claimed(role) => {
                    debug!(part = index, %role, "role assigned by name");
                    roles.claim(role, index, Strategy::Name);
                }
                _ => leftovers.push(index),
            }
        }
        leftovers
    }

    /// Hands the unclaimed roles, highest first, to the leftover parts in
    /// descending order of pitch centre. Extra parts are ignored.
    pub fn assign_by_pitch_center(&self, parts: &[SourcePart], candidates: &[usize], roles: &mut RoleMap) {
        let mut ranked: Vec<(usize, f64)> = candidates
            .iter()
            .map(|&index| (index, pitch_center(&parts[index])))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let open: Vec<Role> = roles.unclaimed().collect();
        for (role, (index, center)) in open.into_iter().zip(ranked) {
            debug!(part = index, %role, center, "role assigned by pitch centre");
            roles.claim(role, index, Strategy::PitchCenter);
        }
    }
}
