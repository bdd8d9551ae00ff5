//! Static entity definitions for the Daylio backup format.
//!
//! Each entity lists its fields in export order: canonical name, external
//! JSON key, value kind and presence. The tables are the single source for
//! decoding, encoding and the `fields` listing of the CLI.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Absent and `null` both resolve to unset.
    Optional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Boolean,
    String,
    /// Integer, boolean or string, classified by the decoded value.
    Scalar,
    IntegerList,
    /// List whose elements are kept verbatim.
    RawList,
    Entity(&'static str),
    EntityList(&'static str),
    /// String-keyed map whose values are the named entity.
    EntityMap(&'static str),
}

impl FieldKind {
    /// Wording used in type mismatch errors.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Scalar => "integer, boolean or string",
            FieldKind::IntegerList | FieldKind::RawList | FieldKind::EntityList(_) => "array",
            FieldKind::Entity(_) | FieldKind::EntityMap(_) => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Integer => f.write_str("integer"),
            FieldKind::Boolean => f.write_str("boolean"),
            FieldKind::String => f.write_str("string"),
            FieldKind::Scalar => f.write_str("integer | boolean | string"),
            FieldKind::IntegerList => f.write_str("[integer]"),
            FieldKind::RawList => f.write_str("[any]"),
            FieldKind::Entity(name) => f.write_str(name),
            FieldKind::EntityList(name) => write!(f, "[{name}]"),
            FieldKind::EntityMap(name) => write!(f, "{{string: {name}}}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(field: &'static str, key: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            key,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(field: &'static str, key: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            key,
            kind,
            presence: Presence::Optional,
        }
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct EntitySpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

use FieldKind::*;

pub static DOCUMENT: EntitySpec = EntitySpec {
    name: "Document",
    fields: &[
        FieldSpec::required("version", "version", Integer),
        FieldSpec::required("is_reminder_on", "isReminderOn", Boolean),
        FieldSpec::required("custom_moods", "customMoods", EntityList("CustomMood")),
        FieldSpec::required("tags", "tags", EntityList("Tag")),
        FieldSpec::required("day_entries", "dayEntries", EntityList("DayEntry")),
        FieldSpec::required("achievements", "achievements", EntityList("Achievement")),
        FieldSpec::required("days_in_row_longest_chain", "daysInRowLongestChain", Integer),
        FieldSpec::required("goals", "goals", RawList),
        FieldSpec::required("prefs", "prefs", EntityList("Pref")),
        FieldSpec::required("tag_groups", "tagGroups", RawList),
        FieldSpec::required("metadata", "metadata", Entity("Metadatum")),
        FieldSpec::required("mood_icons_pack_id", "moodIconsPackId", Integer),
        FieldSpec::required(
            "preferred_mood_icons",
            "preferredMoodIconsIdsForMoodIdsForIconsPack",
            EntityMap("MoodIconSet"),
        ),
        FieldSpec::required("assets", "assets", RawList),
        FieldSpec::required("goal_entries", "goalEntries", RawList),
        FieldSpec::required("goal_success_weeks", "goalSuccessWeeks", RawList),
        FieldSpec::required("reminders", "reminders", EntityList("Reminder")),
        FieldSpec::required("writing_templates", "writingTemplates", EntityList("WritingTemplate")),
        FieldSpec::required(
            "mood_icons_default_free_pack_id",
            "moodIconsDefaultFreePackId",
            Integer,
        ),
    ],
};

pub static CUSTOM_MOOD: EntitySpec = EntitySpec {
    name: "CustomMood",
    fields: &[
        FieldSpec::required("id", "id", Integer),
        FieldSpec::required("custom_name", "custom_name", String),
        FieldSpec::required("mood_group_id", "mood_group_id", Integer),
        FieldSpec::required("mood_group_order", "mood_group_order", Integer),
        FieldSpec::required("icon_id", "icon_id", Integer),
        FieldSpec::required("predefined_name_id", "predefined_name_id", Integer),
        FieldSpec::required("state", "state", Integer),
        FieldSpec::required("created_at", "createdAt", Integer),
    ],
};

pub static TAG: EntitySpec = EntitySpec {
    name: "Tag",
    fields: &[
        FieldSpec::required("id", "id", Integer),
        FieldSpec::required("name", "name", String),
        FieldSpec::required("created_at", "createdAt", Integer),
        FieldSpec::required("icon", "icon", Integer),
        FieldSpec::required("order", "order", Integer),
        FieldSpec::required("state", "state", Integer),
        FieldSpec::required("id_tag_group", "id_tag_group", Integer),
    ],
};

pub static DAY_ENTRY: EntitySpec = EntitySpec {
    name: "DayEntry",
    fields: &[
        FieldSpec::required("id", "id", Integer),
        FieldSpec::required("minute", "minute", Integer),
        FieldSpec::required("hour", "hour", Integer),
        FieldSpec::required("day", "day", Integer),
        FieldSpec::required("month", "month", Integer),
        FieldSpec::required("year", "year", Integer),
        FieldSpec::required("datetime", "datetime", Integer),
        FieldSpec::required("time_zone_offset", "timeZoneOffset", Integer),
        FieldSpec::required("mood", "mood", Integer),
        FieldSpec::required("note", "note", String),
        FieldSpec::required("note_title", "note_title", String),
        FieldSpec::required("tags", "tags", IntegerList),
        FieldSpec::required("assets", "assets", RawList),
    ],
};

/// Milestone progress keys (`AC_*`) are not listed here; see
/// [`crate::schema::achievement`].
pub static ACHIEVEMENT: EntitySpec = EntitySpec {
    name: "Achievement",
    fields: &[FieldSpec::required("name", "name", String)],
};

pub static PREF: EntitySpec = EntitySpec {
    name: "Pref",
    fields: &[
        FieldSpec::required("key", "key", String),
        FieldSpec::required("pref_name", "pref_name", String),
        FieldSpec::required("value", "value", Scalar),
    ],
};

pub static METADATUM: EntitySpec = EntitySpec {
    name: "Metadatum",
    fields: &[
        FieldSpec::required("number_of_entries", "number_of_entries", Integer),
        FieldSpec::required("created_at", "created_at", Integer),
        FieldSpec::required("is_auto_backup", "is_auto_backup", Boolean),
        FieldSpec::required("platform", "platform", String),
        FieldSpec::required("android_version", "android_version", Integer),
        FieldSpec::required("number_of_photos", "number_of_photos", Integer),
        FieldSpec::required("photos_size", "photos_size", Integer),
    ],
};

// Mood-rank keys are numerals; no naming rule recovers them from field names.
pub static MOOD_ICON_SET: EntitySpec = EntitySpec {
    name: "MoodIconSet",
    fields: &[
        FieldSpec::optional("rank_1", "1", Integer),
        FieldSpec::optional("rank_2", "2", Integer),
        FieldSpec::optional("rank_3", "3", Integer),
        FieldSpec::optional("rank_4", "4", Integer),
        FieldSpec::optional("rank_5", "5", Integer),
        FieldSpec::optional("rank_6", "6", Integer),
        FieldSpec::optional("rank_7", "7", Integer),
        FieldSpec::optional("rank_8", "8", Integer),
    ],
};

pub static REMINDER: EntitySpec = EntitySpec {
    name: "Reminder",
    fields: &[
        FieldSpec::required("id", "id", Integer),
        FieldSpec::required("hour", "hour", Integer),
        FieldSpec::required("minute", "minute", Integer),
        FieldSpec::required("state", "state", Integer),
        FieldSpec::required("custom_text_enabled", "custom_text_enabled", Boolean),
    ],
};

pub static WRITING_TEMPLATE: EntitySpec = EntitySpec {
    name: "WritingTemplate",
    fields: &[
        FieldSpec::required("id", "id", Integer),
        FieldSpec::required("order", "order", Integer),
        FieldSpec::required("predefined_template_id", "predefined_template_id", Integer),
        FieldSpec::required("title", "title", String),
        FieldSpec::required("body", "body", String),
    ],
};

static ENTITIES: [&EntitySpec; 10] = [
    &DOCUMENT,
    &CUSTOM_MOOD,
    &TAG,
    &DAY_ENTRY,
    &ACHIEVEMENT,
    &PREF,
    &METADATUM,
    &MOOD_ICON_SET,
    &REMINDER,
    &WRITING_TEMPLATE,
];

pub fn entities() -> &'static [&'static EntitySpec] {
    &ENTITIES
}

/// Case-insensitive lookup by entity name.
pub fn entity(name: &str) -> Option<&'static EntitySpec> {
    ENTITIES
        .iter()
        .copied()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

/// `version` values the registry was written against.
pub const KNOWN_VERSIONS: &[i64] = &[14];
