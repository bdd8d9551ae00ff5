use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::SchemaResult;
use crate::schema::achievement::Achievement;
use crate::schema::alias::ObjectWriter;
use crate::schema::registry::{self, EntitySpec};
use crate::schema::validator::ObjectReader;

/// A record with a registry definition, decodable from and encodable to its
/// external JSON object.
pub trait Entity: Sized {
    fn spec() -> &'static EntitySpec;

    fn read(reader: &ObjectReader<'_>) -> SchemaResult<Self>;

    fn write(&self, writer: &mut ObjectWriter);

    fn decode_at(value: &Value, path: &str) -> SchemaResult<Self> {
        let reader = ObjectReader::new(Self::spec(), value, path)?;
        Self::read(&reader)
    }

    fn from_value(value: &Value) -> SchemaResult<Self> {
        Self::decode_at(value, "$")
    }

    fn to_value(&self) -> SchemaResult<Value> {
        let mut writer = ObjectWriter::new(Self::spec());
        self.write(&mut writer);
        writer.finish()
    }
}

/// One full backup export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub version: i64,
    pub is_reminder_on: bool,
    pub custom_moods: Vec<CustomMood>,
    pub tags: Vec<Tag>,
    pub day_entries: Vec<DayEntry>,
    pub achievements: Vec<Achievement>,
    pub days_in_row_longest_chain: i64,
    pub goals: Vec<Value>,
    pub prefs: Vec<Pref>,
    pub tag_groups: Vec<Value>,
    pub metadata: Metadatum,
    pub mood_icons_pack_id: i64,
    /// Icon pack id -> per-rank icon ids.
    pub preferred_mood_icons: BTreeMap<String, MoodIconSet>,
    pub assets: Vec<Value>,
    pub goal_entries: Vec<Value>,
    pub goal_success_weeks: Vec<Value>,
    pub reminders: Vec<Reminder>,
    pub writing_templates: Vec<WritingTemplate>,
    pub mood_icons_default_free_pack_id: i64,
    pub extra: Map<String, Value>,
}

impl Entity for Document {
    fn spec() -> &'static EntitySpec {
        &registry::DOCUMENT
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            version: r.require_int("version")?,
            is_reminder_on: r.require_bool("is_reminder_on")?,
            custom_moods: r.require_entity_list("custom_moods")?,
            tags: r.require_entity_list("tags")?,
            day_entries: r.require_entity_list("day_entries")?,
            achievements: r.require_entity_list("achievements")?,
            days_in_row_longest_chain: r.require_int("days_in_row_longest_chain")?,
            goals: r.require_raw_list("goals")?,
            prefs: r.require_entity_list("prefs")?,
            tag_groups: r.require_raw_list("tag_groups")?,
            metadata: r.require_entity("metadata")?,
            mood_icons_pack_id: r.require_int("mood_icons_pack_id")?,
            preferred_mood_icons: r.require_entity_map("preferred_mood_icons")?,
            assets: r.require_raw_list("assets")?,
            goal_entries: r.require_raw_list("goal_entries")?,
            goal_success_weeks: r.require_raw_list("goal_success_weeks")?,
            reminders: r.require_entity_list("reminders")?,
            writing_templates: r.require_entity_list("writing_templates")?,
            mood_icons_default_free_pack_id: r.require_int("mood_icons_default_free_pack_id")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("version", self.version)
            .put("is_reminder_on", self.is_reminder_on)
            .put_entities("custom_moods", &self.custom_moods)
            .put_entities("tags", &self.tags)
            .put_entities("day_entries", &self.day_entries)
            .put_entities("achievements", &self.achievements)
            .put("days_in_row_longest_chain", self.days_in_row_longest_chain)
            .put("goals", self.goals.clone())
            .put_entities("prefs", &self.prefs)
            .put("tag_groups", self.tag_groups.clone())
            .put_entity("metadata", &self.metadata)
            .put("mood_icons_pack_id", self.mood_icons_pack_id)
            .put_entity_map("preferred_mood_icons", &self.preferred_mood_icons)
            .put("assets", self.assets.clone())
            .put("goal_entries", self.goal_entries.clone())
            .put("goal_success_weeks", self.goal_success_weeks.clone())
            .put_entities("reminders", &self.reminders)
            .put_entities("writing_templates", &self.writing_templates)
            .put("mood_icons_default_free_pack_id", self.mood_icons_default_free_pack_id)
            .extend_overflow(&self.extra);
    }
}

/// A user-defined mood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomMood {
    pub id: i64,
    pub custom_name: String,
    pub mood_group_id: i64,
    pub mood_group_order: i64,
    pub icon_id: i64,
    pub predefined_name_id: i64,
    pub state: i64,
    pub created_at: i64,
    pub extra: Map<String, Value>,
}

impl Entity for CustomMood {
    fn spec() -> &'static EntitySpec {
        &registry::CUSTOM_MOOD
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            id: r.require_int("id")?,
            custom_name: r.require_string("custom_name")?,
            mood_group_id: r.require_int("mood_group_id")?,
            mood_group_order: r.require_int("mood_group_order")?,
            icon_id: r.require_int("icon_id")?,
            predefined_name_id: r.require_int("predefined_name_id")?,
            state: r.require_int("state")?,
            created_at: r.require_int("created_at")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("id", self.id)
            .put("custom_name", self.custom_name.as_str())
            .put("mood_group_id", self.mood_group_id)
            .put("mood_group_order", self.mood_group_order)
            .put("icon_id", self.icon_id)
            .put("predefined_name_id", self.predefined_name_id)
            .put("state", self.state)
            .put("created_at", self.created_at)
            .extend_overflow(&self.extra);
    }
}

/// A user-defined label attachable to entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub icon: i64,
    pub order: i64,
    pub state: i64,
    pub id_tag_group: i64,
    pub extra: Map<String, Value>,
}

impl Entity for Tag {
    fn spec() -> &'static EntitySpec {
        &registry::TAG
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            id: r.require_int("id")?,
            name: r.require_string("name")?,
            created_at: r.require_int("created_at")?,
            icon: r.require_int("icon")?,
            order: r.require_int("order")?,
            state: r.require_int("state")?,
            id_tag_group: r.require_int("id_tag_group")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("id", self.id)
            .put("name", self.name.as_str())
            .put("created_at", self.created_at)
            .put("icon", self.icon)
            .put("order", self.order)
            .put("state", self.state)
            .put("id_tag_group", self.id_tag_group)
            .extend_overflow(&self.extra);
    }
}

/// One mood-log record.
///
/// `mood` and `tags` are expected to reference `CustomMood` and `Tag` ids of
/// the same document; that is not checked here (see
/// [`crate::schema::consistency`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayEntry {
    pub id: i64,
    pub minute: i64,
    pub hour: i64,
    pub day: i64,
    pub month: i64,
    pub year: i64,
    pub datetime: i64,
    pub time_zone_offset: i64,
    pub mood: i64,
    pub note: String,
    pub note_title: String,
    pub tags: Vec<i64>,
    pub assets: Vec<Value>,
    pub extra: Map<String, Value>,
}

impl Entity for DayEntry {
    fn spec() -> &'static EntitySpec {
        &registry::DAY_ENTRY
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            id: r.require_int("id")?,
            minute: r.require_int("minute")?,
            hour: r.require_int("hour")?,
            day: r.require_int("day")?,
            month: r.require_int("month")?,
            year: r.require_int("year")?,
            datetime: r.require_int("datetime")?,
            time_zone_offset: r.require_int("time_zone_offset")?,
            mood: r.require_int("mood")?,
            note: r.require_string("note")?,
            note_title: r.require_string("note_title")?,
            tags: r.require_int_list("tags")?,
            assets: r.require_raw_list("assets")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("id", self.id)
            .put("minute", self.minute)
            .put("hour", self.hour)
            .put("day", self.day)
            .put("month", self.month)
            .put("year", self.year)
            .put("datetime", self.datetime)
            .put("time_zone_offset", self.time_zone_offset)
            .put("mood", self.mood)
            .put("note", self.note.as_str())
            .put("note_title", self.note_title.as_str())
            .put("tags", self.tags.clone())
            .put("assets", self.assets.clone())
            .extend_overflow(&self.extra);
    }
}

/// Value of a [`Pref`]; the variant follows the JSON type of the export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrefValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl PrefValue {
    /// Booleans are tested first so `true` never reads as `1`.
    pub fn classify(value: &Value) -> Option<Self> {
        if let Some(flag) = value.as_bool() {
            return Some(PrefValue::Boolean(flag));
        }
        if let Some(number) = value.as_i64() {
            return Some(PrefValue::Integer(number));
        }
        value.as_str().map(|s| PrefValue::String(s.to_string()))
    }
}

impl From<&PrefValue> for Value {
    fn from(value: &PrefValue) -> Self {
        match value {
            PrefValue::Boolean(flag) => Value::Bool(*flag),
            PrefValue::Integer(number) => Value::from(*number),
            PrefValue::String(s) => Value::String(s.clone()),
        }
    }
}

/// A single app preference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pref {
    pub key: String,
    pub pref_name: String,
    pub value: PrefValue,
    pub extra: Map<String, Value>,
}

impl Entity for Pref {
    fn spec() -> &'static EntitySpec {
        &registry::PREF
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            key: r.require_string("key")?,
            pref_name: r.require_string("pref_name")?,
            value: r.require_scalar("value")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("key", self.key.as_str())
            .put("pref_name", self.pref_name.as_str())
            .put("value", &self.value)
            .extend_overflow(&self.extra);
    }
}

/// Export-time statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadatum {
    pub number_of_entries: i64,
    pub created_at: i64,
    pub is_auto_backup: bool,
    pub platform: String,
    pub android_version: i64,
    pub number_of_photos: i64,
    pub photos_size: i64,
    pub extra: Map<String, Value>,
}

impl Entity for Metadatum {
    fn spec() -> &'static EntitySpec {
        &registry::METADATUM
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            number_of_entries: r.require_int("number_of_entries")?,
            created_at: r.require_int("created_at")?,
            is_auto_backup: r.require_bool("is_auto_backup")?,
            platform: r.require_string("platform")?,
            android_version: r.require_int("android_version")?,
            number_of_photos: r.require_int("number_of_photos")?,
            photos_size: r.require_int("photos_size")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("number_of_entries", self.number_of_entries)
            .put("created_at", self.created_at)
            .put("is_auto_backup", self.is_auto_backup)
            .put("platform", self.platform.as_str())
            .put("android_version", self.android_version)
            .put("number_of_photos", self.number_of_photos)
            .put("photos_size", self.photos_size)
            .extend_overflow(&self.extra);
    }
}

/// Icon id per mood rank for one icon pack, keyed `"1"`..`"8"` in the export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoodIconSet {
    pub rank_1: Option<i64>,
    pub rank_2: Option<i64>,
    pub rank_3: Option<i64>,
    pub rank_4: Option<i64>,
    pub rank_5: Option<i64>,
    pub rank_6: Option<i64>,
    pub rank_7: Option<i64>,
    pub rank_8: Option<i64>,
    pub extra: Map<String, Value>,
}

impl MoodIconSet {
    /// Icon id for a 1-based rank.
    pub fn icon_for_rank(&self, rank: u8) -> Option<i64> {
        match rank {
            1 => self.rank_1,
            2 => self.rank_2,
            3 => self.rank_3,
            4 => self.rank_4,
            5 => self.rank_5,
            6 => self.rank_6,
            7 => self.rank_7,
            8 => self.rank_8,
            _ => None,
        }
    }
}

impl Entity for MoodIconSet {
    fn spec() -> &'static EntitySpec {
        &registry::MOOD_ICON_SET
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            rank_1: r.int("rank_1")?,
            rank_2: r.int("rank_2")?,
            rank_3: r.int("rank_3")?,
            rank_4: r.int("rank_4")?,
            rank_5: r.int("rank_5")?,
            rank_6: r.int("rank_6")?,
            rank_7: r.int("rank_7")?,
            rank_8: r.int("rank_8")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put_opt("rank_1", self.rank_1)
            .put_opt("rank_2", self.rank_2)
            .put_opt("rank_3", self.rank_3)
            .put_opt("rank_4", self.rank_4)
            .put_opt("rank_5", self.rank_5)
            .put_opt("rank_6", self.rank_6)
            .put_opt("rank_7", self.rank_7)
            .put_opt("rank_8", self.rank_8)
            .extend_overflow(&self.extra);
    }
}

/// A scheduled notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reminder {
    pub id: i64,
    pub hour: i64,
    pub minute: i64,
    pub state: i64,
    pub custom_text_enabled: bool,
    pub extra: Map<String, Value>,
}

impl Entity for Reminder {
    fn spec() -> &'static EntitySpec {
        &registry::REMINDER
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            id: r.require_int("id")?,
            hour: r.require_int("hour")?,
            minute: r.require_int("minute")?,
            state: r.require_int("state")?,
            custom_text_enabled: r.require_bool("custom_text_enabled")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("id", self.id)
            .put("hour", self.hour)
            .put("minute", self.minute)
            .put("state", self.state)
            .put("custom_text_enabled", self.custom_text_enabled)
            .extend_overflow(&self.extra);
    }
}

/// A journaling prompt template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WritingTemplate {
    pub id: i64,
    pub order: i64,
    pub predefined_template_id: i64,
    pub title: String,
    pub body: String,
    pub extra: Map<String, Value>,
}

impl Entity for WritingTemplate {
    fn spec() -> &'static EntitySpec {
        &registry::WRITING_TEMPLATE
    }

    fn read(r: &ObjectReader<'_>) -> SchemaResult<Self> {
        Ok(Self {
            id: r.require_int("id")?,
            order: r.require_int("order")?,
            predefined_template_id: r.require_int("predefined_template_id")?,
            title: r.require_string("title")?,
            body: r.require_string("body")?,
            extra: r.overflow(),
        })
    }

    fn write(&self, w: &mut ObjectWriter) {
        w.put("id", self.id)
            .put("order", self.order)
            .put("predefined_template_id", self.predefined_template_id)
            .put("title", self.title.as_str())
            .put("body", self.body.as_str())
            .extend_overflow(&self.extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use serde_json::json;

    #[test]
    fn pref_value_prefers_boolean_then_integer_then_string() {
        assert_eq!(PrefValue::classify(&json!(true)), Some(PrefValue::Boolean(true)));
        assert_eq!(PrefValue::classify(&json!(42)), Some(PrefValue::Integer(42)));
        assert_eq!(
            PrefValue::classify(&json!("dark")),
            Some(PrefValue::String("dark".to_string()))
        );
        assert_eq!(PrefValue::classify(&json!(1.25)), None);
        assert_eq!(PrefValue::classify(&Value::Null), None);
    }

    #[test]
    fn pref_round_trips_each_variant() {
        for raw in [json!(false), json!(7), json!("system")] {
            let input = json!({"key": "THEME", "pref_name": "theme", "value": raw});
            let pref = Pref::from_value(&input).unwrap();
            assert_eq!(pref.to_value().unwrap(), input);
        }
    }

    #[test]
    fn day_entry_keeps_unknown_keys() {
        let input = json!({
            "id": 3, "minute": 15, "hour": 21, "day": 2, "month": 7, "year": 2022,
            "datetime": 1_659_467_700_000_i64, "timeZoneOffset": 7_200_000,
            "mood": 2, "note": "walk", "note_title": "", "tags": [4, 9],
            "assets": [{"id": 1}], "isFavorite": true
        });
        let entry = DayEntry::from_value(&input).unwrap();
        assert_eq!(entry.time_zone_offset, 7_200_000);
        assert_eq!(entry.tags, vec![4, 9]);
        assert_eq!(entry.extra.get("isFavorite"), Some(&json!(true)));
        assert_eq!(entry.to_value().unwrap(), input);
    }

    #[test]
    fn tag_missing_created_at_names_external_key() {
        let input = json!({"id": 1, "name": "work", "icon": 0, "order": 1, "state": 0, "id_tag_group": 2});
        let err = Tag::from_value(&input).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                entity: "Tag",
                field: "created_at".to_string(),
                key: "createdAt".to_string(),
                path: "$".to_string(),
            }
        );
    }

    #[test]
    fn mood_icon_set_reencodes_numeral_keys_in_rank_order() {
        let input = json!({"8": 80, "1": 10, "3": 30, "2": 20, "5": 50, "4": 40, "7": 70});
        let set = MoodIconSet::from_value(&input).unwrap();
        assert_eq!(set.icon_for_rank(1), Some(10));
        assert_eq!(set.icon_for_rank(6), None);
        assert_eq!(set.icon_for_rank(8), Some(80));

        let encoded = set.to_value().unwrap();
        let keys: Vec<&str> = encoded
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["1", "2", "3", "4", "5", "7", "8"]);
        assert_eq!(encoded, input);
    }
}
