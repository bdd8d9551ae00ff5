//! Achievement progress.
//!
//! The export flattens progress into one object per achievement with keys
//! like `AC_STREAK_SEEN` or `AC_ENTRIES_CURRENT_LEVEL`. New milestones show
//! up with newer app versions and the export `version` does not say which
//! are legal, so milestones are a registered table and everything outside it
//! stays in the overflow bag untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::alias::{ObjectWriter, milestone_key, split_milestone_key};
use crate::schema::registry::{self, EntitySpec, FieldKind};
use crate::schema::types::Entity;
use crate::schema::validator::ObjectReader;

static MILESTONES: &[&str] = &[
    "FIRST_ENTRY",
    "ENTRIES",
    "ENTRIES_BONUS_LVL",
    "ENTRIES_MILLENNIUMS",
    "ENTRIES_ETERNITY",
    "STREAK",
    "MEGA_STREAK",
    "EPIC_STREAK",
    "MYTHICAL_STREAK",
    "STREAK_BONUS",
    "TAGS",
    "MOODS",
    "GOALS_DEDICATED",
    "PAPARAZZI",
    "COLORS",
    "MULTIPLE_ENTRIES",
    "GROUPS",
    "STYLE",
    "SMART",
    "AUTO_BACKUP",
    "PREMIUM",
    "ROLLERCOASTER",
    "PIN_CODE",
    "NO_BACKUP",
    "MEH_DAYS",
    "GOOD_DAYS",
    "RAD_DAYS",
    "MOODS_BONUS",
    "TAGS_BONUS",
    "LUCKY_STREAK",
    "CRYPTIC_STREAK",
    "MYSTERIOUS_STREAK",
    "SAY_CHEESE",
    "YEARLY_REPORT_2022",
    "YEARLY_REPORT_2021",
    "YEARLY_REPORT_2020",
    "YEARLY_REPORT_2019",
    "YEARLY_REPORT_2018",
    "YEARLY_REPORT_2017",
    "YEARLY_REPORT_2016",
];

/// A registered milestone name such as `STREAK`.
///
/// Only obtainable through [`Milestone::lookup`], so every milestone in a
/// constructed [`Achievement`] encodes to keys that decode back to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Milestone(&'static str);

impl Milestone {
    pub fn lookup(name: &str) -> Option<Self> {
        MILESTONES
            .iter()
            .copied()
            .find(|known| *known == name)
            .map(Milestone)
    }

    pub fn all() -> impl Iterator<Item = Milestone> {
        MILESTONES.iter().copied().map(Milestone)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One progress dimension of a milestone, the `<SUFFIX>` in
/// `AC_<MILESTONE>_<SUFFIX>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressField {
    Seen,
    UnlockedAt,
    CurrentLevel,
    CurrentValue,
    LastSeenLevel,
}

impl ProgressField {
    pub const ALL: [ProgressField; 5] = [
        ProgressField::Seen,
        ProgressField::UnlockedAt,
        ProgressField::CurrentLevel,
        ProgressField::CurrentValue,
        ProgressField::LastSeenLevel,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ProgressField::Seen => "SEEN",
            ProgressField::UnlockedAt => "UNLOCKED_AT",
            ProgressField::CurrentLevel => "CURRENT_LEVEL",
            ProgressField::CurrentValue => "CURRENT_VALUE",
            ProgressField::LastSeenLevel => "LAST_SEEN_LEVEL",
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ProgressField::Seen => "seen",
            ProgressField::UnlockedAt => "unlocked_at",
            ProgressField::CurrentLevel => "current_level",
            ProgressField::CurrentValue => "current_value",
            ProgressField::LastSeenLevel => "last_seen_level",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            ProgressField::Seen => FieldKind::Boolean,
            _ => FieldKind::Integer,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MilestoneProgress {
    pub seen: Option<bool>,
    pub unlocked_at: Option<i64>,
    pub current_level: Option<i64>,
    pub current_value: Option<i64>,
    pub last_seen_level: Option<i64>,
}

impl MilestoneProgress {
    pub fn is_unset(&self) -> bool {
        *self == MilestoneProgress::default()
    }

    fn get(&self, field: ProgressField) -> Option<Value> {
        match field {
            ProgressField::Seen => self.seen.map(Value::Bool),
            ProgressField::UnlockedAt => self.unlocked_at.map(Value::from),
            ProgressField::CurrentLevel => self.current_level.map(Value::from),
            ProgressField::CurrentValue => self.current_value.map(Value::from),
            ProgressField::LastSeenLevel => self.last_seen_level.map(Value::from),
        }
    }

    /// Stores `value` if it has the field's JSON type; `null` leaves the
    /// field unset. Returns `false` on a type mismatch.
    fn set(&mut self, field: ProgressField, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match field {
            ProgressField::Seen => value.as_bool().map(|v| self.seen = Some(v)).is_some(),
            ProgressField::UnlockedAt => value.as_i64().map(|v| self.unlocked_at = Some(v)).is_some(),
            ProgressField::CurrentLevel => {
                value.as_i64().map(|v| self.current_level = Some(v)).is_some()
            }
            ProgressField::CurrentValue => {
                value.as_i64().map(|v| self.current_value = Some(v)).is_some()
            }
            ProgressField::LastSeenLevel => {
                value.as_i64().map(|v| self.last_seen_level = Some(v)).is_some()
            }
        }
    }
}

/// Progress state for one achievement type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub name: String,
    /// Milestones with at least one progress field present in the export.
    pub milestones: BTreeMap<Milestone, MilestoneProgress>,
    pub extra: Map<String, Value>,
}

impl Achievement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            milestones: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    pub fn progress(&self, milestone: &str) -> Option<&MilestoneProgress> {
        Milestone::lookup(milestone).and_then(|m| self.milestones.get(&m))
    }
}

impl Entity for Achievement {
    fn spec() -> &'static EntitySpec {
        &registry::ACHIEVEMENT
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        let name = r.require_string("name")?;

        let mut milestones: BTreeMap<Milestone, MilestoneProgress> = BTreeMap::new();
        for (key, value) in r.entries() {
            let Some((milestone, field)) = split_milestone_key(key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let progress = milestones.entry(milestone).or_default();
            if !progress.set(field, value) {
                return Err(r.mismatch_key(
                    format!("{milestone}.{}", field.field()),
                    key,
                    field.kind().expected(),
                    value,
                ));
            }
        }

        Ok(Self {
            name,
            milestones,
            extra: r.overflow_where(|key, value| value.is_null() || split_milestone_key(key).is_none()),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("name", self.name.as_str());
        for (milestone, progress) in &self.milestones {
            if progress.is_unset() {
                w.fail(SchemaError::EmptyMilestone {
                    entity: registry::ACHIEVEMENT.name,
                    milestone: milestone.to_string(),
                });
                continue;
            }
            for field in ProgressField::ALL {
                if let Some(value) = progress.get(field) {
                    w.put_key(milestone_key(*milestone, field), value);
                }
            }
        }
        w.extend_overflow_where(&self.extra, |key| split_milestone_key(key).is_some());
    }
}
