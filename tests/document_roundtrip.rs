use daylio_backup::schema::registry::DOCUMENT;
use daylio_backup::schema::types::{Entity, PrefValue};
use daylio_backup::schema::{Achievement, Milestone, MilestoneProgress, check_references};
use daylio_backup::{
    Document, SchemaError, ValidationOptions, Warning, encode_document, is_valid_document,
    parse_document, validate_document, validate_document_with,
};
use serde_json::{Value, json};

fn minimal() -> Value {
    json!({
        "version": 14,
        "isReminderOn": true,
        "customMoods": [],
        "tags": [],
        "dayEntries": [{
            "id": 1, "minute": 0, "hour": 9, "day": 5, "month": 3, "year": 2023,
            "datetime": 1678000000, "timeZoneOffset": 0, "mood": 1, "note": "",
            "note_title": "", "tags": [], "assets": []
        }],
        "achievements": [{"name": "x"}],
        "daysInRowLongestChain": 0,
        "goals": [],
        "prefs": [],
        "tagGroups": [],
        "metadata": {
            "number_of_entries": 1, "created_at": 1678000500000i64, "is_auto_backup": false,
            "platform": "android", "android_version": 15, "number_of_photos": 0,
            "photos_size": 0
        },
        "moodIconsPackId": 1,
        "preferredMoodIconsIdsForMoodIdsForIconsPack": {
            "1": {"1": 1, "2": 2, "3": 3, "4": 4, "5": 5, "7": 7, "8": 8}
        },
        "assets": [],
        "goalEntries": [],
        "goalSuccessWeeks": [],
        "reminders": [],
        "writingTemplates": [],
        "moodIconsDefaultFreePackId": 1
    })
}

/// A fuller export: prefs of every type, achievement progress, unknown keys.
fn rich() -> Value {
    let mut doc = minimal();
    doc["customMoods"] = json!([{
        "id": 1, "custom_name": "", "mood_group_id": 1, "mood_group_order": 0,
        "icon_id": 1, "predefined_name_id": 1, "state": 0, "createdAt": 1600000000000i64
    }]);
    doc["tags"] = json!([{
        "id": 4, "name": "work", "createdAt": 1600000000000i64, "icon": 12, "order": 1,
        "state": 0, "id_tag_group": 1
    }]);
    doc["dayEntries"][0]["tags"] = json!([4]);
    doc["achievements"] = json!([{
        "name": "AC_STREAK",
        "AC_STREAK_SEEN": true,
        "AC_STREAK_UNLOCKED_AT": 1650000000000i64,
        "AC_STREAK_CURRENT_LEVEL": 3,
        "AC_STREAK_BONUS_CURRENT_VALUE": 17
    }]);
    doc["prefs"] = json!([
        {"key": "PREF_DARK_MODE", "pref_name": "default", "value": true},
        {"key": "PREF_FIRST_DAY", "pref_name": "default", "value": 2},
        {"key": "PREF_LANG", "pref_name": "default", "value": "en"}
    ]);
    doc["reminders"] = json!([{
        "id": 1, "hour": 20, "minute": 0, "state": 0, "custom_text_enabled": false
    }]);
    doc["writingTemplates"] = json!([{
        "id": 1, "order": 0, "predefined_template_id": 2, "title": "Gratitude",
        "body": "Three things"
    }]);
    doc["preferredMoodIconsIdsForMoodIdsForIconsPack"]["2"] =
        json!({"1": 11, "2": 12, "3": 13, "4": 14, "5": 15, "6": 16, "7": 17, "8": 18});
    doc["platformHints"] = json!({"theme": 3});
    doc
}

#[test]
fn minimal_document_validates() {
    let validation = validate_document(&minimal()).unwrap();
    let doc = &validation.document;
    assert_eq!(doc.day_entries[0].mood, 1);
    assert_eq!(doc.version, 14);
    assert!(doc.is_reminder_on);
    assert_eq!(doc.achievements[0].name, "x");
    assert!(validation.warnings.is_empty());

    let icons = &doc.preferred_mood_icons["1"];
    assert_eq!(icons.rank_5, Some(5));
    assert_eq!(icons.rank_6, None);
    assert_eq!(icons.icon_for_rank(8), Some(8));
}

#[test]
fn parse_document_accepts_text() {
    let text = minimal().to_string();
    assert!(is_valid_document(&text));
    assert_eq!(parse_document(&text).unwrap().document.day_entries.len(), 1);
    assert!(!is_valid_document("not json"));
}

#[test]
fn removing_version_names_that_field() {
    let mut value = minimal();
    value.as_object_mut().unwrap().remove("version");
    let err = validate_document(&value).unwrap_err();
    assert_eq!(
        err,
        SchemaError::MissingField {
            entity: "Document",
            field: "version".to_string(),
            key: "version".to_string(),
            path: "$".to_string(),
        }
    );
}

#[test]
fn removing_any_required_document_key_names_that_key() {
    for field in DOCUMENT.fields.iter().filter(|field| field.is_required()) {
        let mut value = minimal();
        value.as_object_mut().unwrap().remove(field.key);
        match validate_document(&value).unwrap_err() {
            SchemaError::MissingField {
                entity,
                field: name,
                key,
                path,
            } => {
                assert_eq!(entity, "Document");
                assert_eq!(name, field.field);
                assert_eq!(key, field.key);
                assert_eq!(path, "$");
            }
            other => panic!("removing {} gave {other}", field.key),
        }
    }
}

#[test]
fn nested_failure_carries_json_path() {
    let mut value = minimal();
    value["dayEntries"][0]
        .as_object_mut()
        .unwrap()
        .remove("timeZoneOffset");
    let err = validate_document(&value).unwrap_err();
    assert_eq!(
        err.to_string(),
        "DayEntry.time_zone_offset (key \"timeZoneOffset\") at $.dayEntries[0]: missing required field"
    );
}

#[test]
fn wrong_scalar_type_is_rejected() {
    let mut value = minimal();
    value["isReminderOn"] = json!(1);
    assert!(matches!(
        validate_document(&value).unwrap_err(),
        SchemaError::TypeMismatch { expected: "boolean", actual: "integer", .. }
    ));
}

#[test]
fn accepted_documents_reencode_to_their_input() {
    for input in [minimal(), rich()] {
        let doc = validate_document(&input).unwrap().document;
        let encoded = encode_document(&doc).unwrap();
        assert_eq!(encoded, input);

        let again = validate_document(&encoded).unwrap().document;
        assert_eq!(again, doc);
    }
}

#[test]
fn numeral_keys_keep_their_literal_order() {
    let doc = validate_document(&rich()).unwrap().document;
    let encoded = encode_document(&doc).unwrap();
    let pack = encoded["preferredMoodIconsIdsForMoodIdsForIconsPack"]["2"]
        .as_object()
        .unwrap();
    let keys: Vec<&str> = pack.keys().map(String::as_str).collect();
    assert_eq!(keys, ["1", "2", "3", "4", "5", "6", "7", "8"]);
    assert_eq!(pack["6"], 16);
}

#[test]
fn pref_values_keep_their_json_type() {
    let doc = validate_document(&rich()).unwrap().document;
    let values: Vec<&PrefValue> = doc.prefs.iter().map(|pref| &pref.value).collect();
    assert_eq!(
        values,
        [
            &PrefValue::Boolean(true),
            &PrefValue::Integer(2),
            &PrefValue::String("en".to_string())
        ]
    );
}

#[test]
fn achievement_progress_is_split_by_milestone() {
    let doc = validate_document(&rich()).unwrap().document;
    let achievement = &doc.achievements[0];

    let streak = achievement.progress("STREAK").unwrap();
    assert_eq!(streak.seen, Some(true));
    assert_eq!(streak.unlocked_at, Some(1650000000000));
    assert_eq!(streak.current_level, Some(3));
    assert_eq!(streak.current_value, None);

    let bonus = achievement.progress("STREAK_BONUS").unwrap();
    assert_eq!(bonus.current_value, Some(17));
    assert!(achievement.extra.is_empty());
}

#[test]
fn unknown_achievement_keys_survive_a_round_trip() {
    let mut value = minimal();
    value["achievements"][0]["AC_TIME_TRAVELLER_SEEN"] = json!(false);
    value["achievements"][0]["AC_STREAK_SEEN"] = json!(true);

    let doc = validate_document(&value).unwrap().document;
    let achievement = &doc.achievements[0];
    assert_eq!(achievement.extra["AC_TIME_TRAVELLER_SEEN"], json!(false));
    assert!(achievement.progress("STREAK").is_some());

    assert_eq!(encode_document(&doc).unwrap(), value);
}

#[test]
fn unknown_top_level_keys_are_kept() {
    let doc = validate_document(&rich()).unwrap().document;
    assert_eq!(doc.extra["platformHints"], json!({"theme": 3}));
}

#[test]
fn constructed_document_round_trips() {
    let mut doc = validate_document(&minimal()).unwrap().document;
    let mut achievement = Achievement::new("AC_ENTRIES");
    achievement.milestones.insert(
        Milestone::lookup("ENTRIES").unwrap(),
        MilestoneProgress {
            seen: Some(false),
            current_level: Some(1),
            ..MilestoneProgress::default()
        },
    );
    doc.achievements.push(achievement);

    let encoded = encode_document(&doc).unwrap();
    assert_eq!(encoded["achievements"][1]["AC_ENTRIES_CURRENT_LEVEL"], 1);
    assert_eq!(Document::from_value(&encoded).unwrap(), doc);
}

#[test]
fn unknown_version_validates_with_a_warning() {
    let mut value = minimal();
    value["version"] = json!(15);
    let validation = validate_document(&value).unwrap();
    assert_eq!(
        validation.warnings,
        vec![Warning::UnknownVersion {
            version: 15,
            known: vec![14]
        }]
    );

    let options = ValidationOptions {
        known_versions: vec![14, 15],
    };
    assert!(validate_document_with(&value, &options).unwrap().warnings.is_empty());
}

#[test]
fn reference_checks_are_advisory() {
    let mut value = rich();
    value["dayEntries"][0]["mood"] = json!(9);
    let doc = validate_document(&value).unwrap().document;
    let issues = check_references(&doc);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].to_string(), "day entry 1 references unknown mood 9");
}

#[test]
fn explicit_nulls_in_optional_slots_reencode_exactly() {
    let mut value = minimal();
    value["achievements"] = json!([{"name": "x", "AC_STREAK_SEEN": null}]);
    value["preferredMoodIconsIdsForMoodIdsForIconsPack"] = json!({"1": {"1": null, "2": 5}});

    let doc = validate_document(&value).unwrap().document;
    assert!(doc.achievements[0].progress("STREAK").is_none());
    let icons = &doc.preferred_mood_icons["1"];
    assert_eq!(icons.rank_1, None);
    assert_eq!(icons.rank_2, Some(5));

    assert_eq!(encode_document(&doc).unwrap(), value);
}

#[test]
fn constructed_graphs_that_would_not_decode_back_are_rejected() {
    let base = validate_document(&minimal()).unwrap().document;

    let mut shadowed_rank = base.clone();
    let icons = shadowed_rank.preferred_mood_icons.get_mut("1").unwrap();
    icons.extra.insert("1".to_string(), json!(99));
    assert!(matches!(
        encode_document(&shadowed_rank).unwrap_err(),
        SchemaError::OverflowCollision { entity: "MoodIconSet", ref key } if key == "1"
    ));

    let mut shadowed_milestone = base.clone();
    shadowed_milestone.achievements[0]
        .extra
        .insert("AC_STREAK_SEEN".to_string(), json!(true));
    assert!(matches!(
        encode_document(&shadowed_milestone).unwrap_err(),
        SchemaError::OverflowCollision { entity: "Achievement", .. }
    ));

    let mut empty_progress = base;
    empty_progress.achievements[0]
        .milestones
        .insert(Milestone::lookup("STREAK").unwrap(), MilestoneProgress::default());
    assert!(matches!(
        encode_document(&empty_progress).unwrap_err(),
        SchemaError::EmptyMilestone { entity: "Achievement", .. }
    ));
}
