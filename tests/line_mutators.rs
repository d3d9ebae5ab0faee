// Edits of single task lines: each edit touches its own field only and can be
// repeated without changing the result.
use chrono::NaiveDate;
use intuitask::error::MutationError;
use intuitask::model::mutator::{
    normalize, remove_property, set_date, set_description, set_priority, set_property,
    set_recurrence, set_status, toggle_completion,
};
use intuitask::model::{DateKind, Priority, Task, TaskEdit, TaskStatus, parse};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_mark_done() {
    assert_eq!(
        set_status("- [ ] Buy milk", TaskStatus::Done).unwrap(),
        "- [x] Buy milk"
    );
}

#[test]
fn test_replace_priority() {
    assert_eq!(
        set_priority("- [ ] Ship report ⏫", Priority::Low).unwrap(),
        "- [ ] Ship report 🔽"
    );
}

#[test]
fn test_replace_due_date() {
    assert_eq!(
        set_date("- [ ] Ship report 📅 2024-03-01", DateKind::Due, Some(d(2024, 4, 15))).unwrap(),
        "- [ ] Ship report 📅 2024-04-15"
    );
}

#[test]
fn test_replace_property_in_place() {
    assert_eq!(
        set_property("- [ ] Task [client:acme]", "client", "globex").unwrap(),
        "- [ ] Task [client:globex]"
    );
    assert_eq!(
        set_property("- [ ] Task [client:acme] 📅 2024-01-01", "client", "globex").unwrap(),
        "- [ ] Task [client:globex] 📅 2024-01-01"
    );
}

#[test]
fn test_normal_priority_removes_emoji() {
    let out = set_priority("- [ ] Ship report ⏫ 📅 2024-03-01", Priority::Normal).unwrap();
    assert_eq!(out, "- [ ] Ship report 📅 2024-03-01");
    assert!(!out.contains('⏫'));
}

#[test]
fn test_clearing_a_date() {
    assert_eq!(
        set_date("- [ ] a 📅 2024-03-01 ⏳ 2024-02-01", DateKind::Due, None).unwrap(),
        "- [ ] a ⏳ 2024-02-01"
    );
    // Clearing an absent date is a no-op.
    assert_eq!(set_date("- [ ] a", DateKind::Due, None).unwrap(), "- [ ] a");
}

#[test]
fn test_edits_are_idempotent() {
    let line = "- [ ] Ship report 🔼 📅 2024-03-01 [client:acme] 🔁 every week";
    let edits = [
        TaskEdit::Status(TaskStatus::InProgress),
        TaskEdit::Priority(Priority::Highest),
        TaskEdit::Priority(Priority::Normal),
        TaskEdit::Date(DateKind::Due, Some(d(2025, 1, 1))),
        TaskEdit::Date(DateKind::Start, Some(d(2024, 12, 1))),
        TaskEdit::Date(DateKind::Due, None),
        TaskEdit::Recurrence("every 2 days".to_string()),
        TaskEdit::Recurrence(String::new()),
        TaskEdit::Property {
            key: "client".to_string(),
            value: "globex".to_string(),
        },
        TaskEdit::Property {
            key: "owner".to_string(),
            value: "sam".to_string(),
        },
        TaskEdit::RemoveProperty("client".to_string()),
        TaskEdit::Description("Send report".to_string()),
        TaskEdit::Normalize,
    ];
    for edit in &edits {
        let once = edit.apply(line).unwrap();
        let twice = edit.apply(&once).unwrap();
        assert_eq!(once, twice, "edit {:?} is not idempotent", edit);
    }
}

#[test]
fn test_edits_do_not_leak_into_other_fields() {
    let line = "- [ ] Ship report 🔼 📅 2024-03-01 [client:acme] 🔁 every week";
    let before = parse(line).unwrap();

    let after = parse(&set_priority(line, Priority::Low).unwrap()).unwrap();
    assert_eq!(after.priority, Priority::Low);
    assert_eq!(after.dates, before.dates);
    assert_eq!(after.properties, before.properties);
    assert_eq!(after.recurrence, before.recurrence);
    assert_eq!(after.description, before.description);

    let after = parse(&set_date(line, DateKind::Scheduled, Some(d(2024, 2, 1))).unwrap()).unwrap();
    assert_eq!(after.date(DateKind::Due), Some(d(2024, 3, 1)));
    assert_eq!(after.date(DateKind::Scheduled), Some(d(2024, 2, 1)));
    assert_eq!(after.priority, before.priority);

    let after = parse(&set_property(line, "due", "tomorrow").unwrap()).unwrap();
    assert_eq!(after.date(DateKind::Due), Some(d(2024, 3, 1)));
    assert_eq!(after.property("due"), Some("tomorrow"));
}

#[test]
fn test_status_edit_keeps_spacing_and_indent() {
    let line = "    - [ ] Nested   task  📅 2024-03-01";
    assert_eq!(
        set_status(line, TaskStatus::Cancelled).unwrap(),
        "    - [-] Nested   task  📅 2024-03-01"
    );
}

#[test]
fn test_toggle() {
    assert_eq!(toggle_completion("- [/] a").unwrap(), "- [x] a");
    assert_eq!(toggle_completion("- [X] a").unwrap(), "- [ ] a");
}

#[test]
fn test_malformed_lines_are_rejected() {
    for line in ["[ ] Buy milk", "Buy milk", "- [ ]Buy milk", ""] {
        assert!(
            matches!(
                set_status(line, TaskStatus::Done),
                Err(MutationError::MalformedLine)
            ),
            "line: {:?}",
            line
        );
        assert!(matches!(
            set_priority(line, Priority::High),
            Err(MutationError::MalformedLine)
        ));
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let line = "- [ ] a";
    assert!(matches!(
        set_property(line, "bad key", "v"),
        Err(MutationError::InvalidValue(_))
    ));
    assert!(matches!(
        set_property(line, "k", "a]b"),
        Err(MutationError::InvalidValue(_))
    ));
    assert!(matches!(
        set_recurrence(line, "every day 📅"),
        Err(MutationError::InvalidValue(_))
    ));
    assert!(matches!(
        set_description(line, "two\nlines"),
        Err(MutationError::InvalidValue(_))
    ));
    assert!(matches!(
        set_description(line, "sneaky ⏫"),
        Err(MutationError::InvalidValue(_))
    ));
}

#[test]
fn test_stray_emoji_survive_unrelated_edits() {
    let line = "- [ ] Pay rent 📅 soon";
    let out = set_priority(line, Priority::High).unwrap();
    assert_eq!(out, "- [ ] Pay rent 📅 soon ⏫");

    // Setting the date replaces the stray one.
    let out = set_date(&out, DateKind::Due, Some(d(2024, 6, 1))).unwrap();
    assert_eq!(out, "- [ ] Pay rent soon ⏫ 📅 2024-06-01");
}

#[test]
fn test_description_and_property_removal() {
    let line = "- [ ] Old text ⏫ [k:v] [x:y]";
    assert_eq!(
        set_description(line, "New  text").unwrap(),
        "- [ ] New text ⏫ [k:v] [x:y]"
    );
    assert_eq!(remove_property(line, "k").unwrap(), "- [ ] Old text ⏫ [x:y]");
}

#[test]
fn test_normalize_reorders_and_dedupes() {
    let line = "- [ ] [k:v] 📅 2024-03-01 b ⏫ a 🔽";
    let out = normalize(line).unwrap();
    assert_eq!(out, "- [ ] b a ⏫ 📅 2024-03-01 [k:v]");
    assert_eq!(normalize(&out).unwrap(), out);
}

const IRREGULAR_LINES: &[&str] = &[
    "- [ ] plain",
    "- [ ] Pay 📅⏫2024-01-01",
    "- [ ] Water 🔁[k:v] every day",
    "- [ ] a ⏫ 🔽 📅 2024-01-01 📅 2024-02-02 [k:v] [k:w]",
    "- [ ] a 🔁 every week ⏫ foo ⏳ 2024-03-03",
    "- [/] Pay rent 📅 soon ✅ 2024-01-01 🔁",
    "  - [ ] T [note:📅 2024-01-01] ➕ 2024-01-01",
];

/// Fields of `task` that `edit` may not change, in comparable form.
fn untouched(task: &Task, edit: &TaskEdit) -> Task {
    let mut t = task.clone();
    match edit {
        TaskEdit::Status(_) | TaskEdit::ToggleCompletion => t.status = TaskStatus::Todo,
        TaskEdit::Priority(_) => t.priority = Priority::Normal,
        TaskEdit::Date(kind, _) => {
            t.dates.remove(kind);
        }
        TaskEdit::Recurrence(_) => t.recurrence = None,
        TaskEdit::Property { key, .. } | TaskEdit::RemoveProperty(key) => {
            t.properties.retain(|p| &p.key != key)
        }
        TaskEdit::Description(_) => t.description.clear(),
        TaskEdit::Normalize => {}
    }
    t
}

#[test]
fn test_irregular_lines_keep_untouched_fields() {
    let edits = [
        TaskEdit::Status(TaskStatus::Done),
        TaskEdit::ToggleCompletion,
        TaskEdit::Priority(Priority::High),
        TaskEdit::Priority(Priority::Normal),
        TaskEdit::Date(DateKind::Due, Some(d(2025, 1, 1))),
        TaskEdit::Date(DateKind::Due, None),
        TaskEdit::Date(DateKind::Scheduled, None),
        TaskEdit::Date(DateKind::Completion, None),
        TaskEdit::Recurrence("every 2 days".to_string()),
        TaskEdit::Recurrence(String::new()),
        TaskEdit::Property {
            key: "k".to_string(),
            value: "z".to_string(),
        },
        TaskEdit::RemoveProperty("k".to_string()),
        TaskEdit::Description("New text".to_string()),
        TaskEdit::Normalize,
    ];

    for line in IRREGULAR_LINES {
        let before = parse(line).unwrap();
        for edit in &edits {
            let once = edit.apply(line).unwrap();
            let after = parse(&once).unwrap();
            assert_eq!(
                untouched(&after, edit),
                untouched(&before, edit),
                "{:?} on {:?} gave {:?}",
                edit,
                line,
                once
            );
            if *edit != TaskEdit::ToggleCompletion {
                assert_eq!(edit.apply(&once).unwrap(), once, "{:?} on {:?}", edit, line);
            }
        }
    }
}

#[test]
fn test_freed_text_is_not_claimed_by_stray_emoji() {
    let line = "- [ ] Pay 📅⏫2024-01-01";
    let out = set_priority(line, Priority::Normal).unwrap();
    let task = parse(&out).unwrap();
    assert!(task.dates.is_empty());
    assert_eq!(task.description, "Pay 2024-01-01");

    let line = "- [ ] Water 🔁[k:v] every day";
    let task = parse(&remove_property(line, "k").unwrap()).unwrap();
    assert_eq!(task.recurrence, None);
    assert_eq!(task.description, "Water every day");
}

#[test]
fn test_date_inside_brackets_is_a_real_date() {
    let line = "- [ ] T [note:📅 2024-01-01]";
    let task = parse(line).unwrap();
    assert_eq!(task.date(DateKind::Due), Some(d(2024, 1, 1)));
    assert!(task.properties.is_empty());

    let out = set_date(line, DateKind::Due, Some(d(2024, 2, 2))).unwrap();
    assert_eq!(out.matches('📅').count(), 1);
    assert_eq!(parse(&out).unwrap().date(DateKind::Due), Some(d(2024, 2, 2)));
}
