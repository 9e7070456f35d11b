//! Cross-module schedule tests against the in-memory workspace.

use std::time::Duration;

use care_core::date_key::format_dmy;
use care_core::schedule::{self, DayLabel};
use care_core::settings::{load_config, CareConfig};
use care_core::treatment::TREATMENT_HEADER;
use care_core::{
    AnimalType, CareError, CompletionRequest, DeleteMode, ScheduleOptions, Settings, SlotState,
    TimeSlot, TreatmentRecord,
};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use mock_sheets::{CellValue, DocumentId, MemoryWorkspace};

const ROSTER_HEADER: [&str; 4] = ["שם", "שבב", "מין", "בטיפול"];
const FOLDER: &str = "donkey-folder";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn options() -> ScheduleOptions {
    ScheduleOptions {
        scan_delay: Duration::ZERO,
        ..ScheduleOptions::default()
    }
}

fn row(date: NaiveDate, slots: [&str; 3], case: &str) -> Vec<CellValue> {
    vec![
        CellValue::text(format_dmy(date)),
        CellValue::text(""),
        CellValue::text(slots[0]),
        CellValue::text(slots[1]),
        CellValue::text(slots[2]),
        CellValue::text("Bute"),
        CellValue::text("2g"),
        CellValue::text("PO"),
        CellValue::text("1"),
        CellValue::text(""),
        CellValue::text(case),
    ]
}

struct Facility {
    store: MemoryWorkspace,
    config: CareConfig,
    max: DocumentId,
}

async fn facility() -> Facility {
    let store = MemoryWorkspace::new();
    let roster = store.add_document("donkeys", "Donkeys", None, &ROSTER_HEADER);
    store.push_row(
        &roster,
        vec!["Max".into(), "900000000000001".into(), "M".into(), "Dana, Avi".into()],
    );
    store.push_row(
        &roster,
        vec!["Luna".into(), "900000000000002".into(), "F".into(), "Avi".into()],
    );

    let max = store.add_document("max-sheet", "Max 900000000000001", Some(FOLDER), &TREATMENT_HEADER);
    store.push_row(&max, row(today(), ["", "FALSE", ""], "Checkup"));

    let luna = store.add_document("luna-sheet", "Luna 900000000000002", Some(FOLDER), &TREATMENT_HEADER);
    store.push_row(&luna, row(today() - ChronoDuration::days(3), ["FALSE", "", ""], "Hoof"));

    let bootstrap = Settings::from_pairs([
        ("DONKEYS_SHEET_ID", "donkeys"),
        ("DONKEYS_DRIVE_FOLDER_ID", FOLDER),
    ]);
    let config = load_config(&store, &bootstrap).await.unwrap();
    Facility { store, config, max }
}

fn completion(case: Option<&str>, slot: TimeSlot, done: bool) -> CompletionRequest {
    CompletionRequest {
        animal_name: "Max".to_string(),
        animal_type: AnimalType::Donkey,
        medical_case: case.map(str::to_string),
        time_slot: slot,
        is_completed: done,
    }
}

#[tokio::test]
async fn caregiver_feed_is_gated_by_presence_not_completion() {
    let f = facility().await;
    let store = &f.store;

    let before = schedule::caregiver_animals(store, store, &f.config, "Dana", today())
        .await
        .unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].animal.name, "Max");
    assert_eq!(before[0].animal_type, AnimalType::Donkey);

    let board = schedule::daily_board(store, store, &f.config, &options(), today(), Utc::now()).await;
    let noon: Vec<_> = board
        .entries
        .iter()
        .filter(|e| e.animal_name == "Max" && e.time_slot == TimeSlot::Noon)
        .collect();
    assert_eq!(noon.len(), 1);
    assert!(!noon[0].is_completed);
    assert_eq!(noon[0].date_label, DayLabel::Today);
    assert_eq!(noon[0].medical_case, "Checkup");
    assert_eq!(noon[0].time, "14:00");

    let outcome = schedule::complete(
        store,
        store,
        &f.config,
        &completion(Some("Checkup"), TimeSlot::Noon, true),
        today(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.rows_updated, 1);
    assert_eq!(outcome.row_numbers, vec![2]);

    let after = schedule::caregiver_animals(store, store, &f.config, "Dana", today())
        .await
        .unwrap();
    assert_eq!(after.len(), 1);
    assert!(schedule::has_treatment_on(store, &f.max, today()).await.unwrap());

    let board = schedule::daily_board(store, store, &f.config, &options(), today(), Utc::now()).await;
    let noon = board
        .entries
        .iter()
        .find(|e| e.animal_name == "Max" && e.time_slot == TimeSlot::Noon)
        .unwrap();
    assert!(noon.is_completed);
    assert!(board.due().all(|e| e.animal_name != "Max"));
}

#[tokio::test]
async fn caregiver_feed_skips_animals_without_rows_today() {
    let f = facility().await;
    let animals = schedule::caregiver_animals(&f.store, &f.store, &f.config, "Avi", today())
        .await
        .unwrap();
    let names: Vec<&str> = animals.iter().map(|a| a.animal.name.as_str()).collect();
    assert_eq!(names, vec!["Max"]);
}

#[tokio::test]
async fn completion_fans_out_to_every_matching_row() {
    let f = facility().await;
    f.store.push_row(&f.max, row(today(), ["FALSE", "", ""], "X"));
    f.store.push_row(&f.max, row(today(), ["FALSE", "", ""], "X"));
    f.store.push_row(&f.max, row(today(), ["FALSE", "", ""], "Y"));

    let outcome = schedule::complete(
        &f.store,
        &f.store,
        &f.config,
        &completion(Some("X"), TimeSlot::Morning, true),
        today(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.rows_updated, 2);

    let rows = f.store.rows(&f.max);
    assert_eq!(rows[1][2], CellValue::Bool(true));
    assert_eq!(rows[2][2], CellValue::Bool(true));
    assert_eq!(rows[3][2], CellValue::Text("FALSE".to_string()));
}

#[tokio::test]
async fn completion_without_case_matches_any_case() {
    let f = facility().await;
    f.store.push_row(&f.max, row(today(), ["", "TRUE", ""], "Other"));

    let outcome = schedule::complete(
        &f.store,
        &f.store,
        &f.config,
        &completion(None, TimeSlot::Noon, false),
        today(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.row_numbers, vec![2, 3]);
}

#[tokio::test]
async fn completion_without_checkbox_row_is_not_found() {
    let f = facility().await;
    let result = schedule::complete(
        &f.store,
        &f.store,
        &f.config,
        &completion(Some("Checkup"), TimeSlot::Evening, true),
        today(),
    )
    .await;
    assert!(matches!(result, Err(CareError::NotFound { entity: "treatment row", .. })));

    let result = schedule::complete(
        &f.store,
        &f.store,
        &f.config,
        &completion(Some("Checkup"), TimeSlot::General, true),
        today(),
    )
    .await;
    assert!(matches!(result, Err(CareError::InvalidInput(_))));
}

#[tokio::test]
async fn board_splits_slots_and_general_rows() {
    let f = facility().await;
    f.store.push_row(&f.max, row(today(), ["", "", ""], ""));
    f.store.push_row(&f.max, row(today() + ChronoDuration::days(1), ["FALSE", "", "FALSE"], "Eye"));

    let board = schedule::daily_board(&f.store, &f.store, &f.config, &options(), today(), Utc::now()).await;
    let max: Vec<_> = board.entries.iter().filter(|e| e.animal_name == "Max").collect();

    let today_slots: Vec<TimeSlot> = max
        .iter()
        .filter(|e| e.date_label == DayLabel::Today)
        .map(|e| e.time_slot)
        .collect();
    assert_eq!(today_slots, vec![TimeSlot::Noon, TimeSlot::General]);

    let general = max.iter().find(|e| e.time_slot == TimeSlot::General).unwrap();
    assert_eq!(general.medical_case, schedule::DEFAULT_CASE);
    assert_eq!(general.treatment_type, "טיפול כללי");

    let tomorrow: Vec<_> = max.iter().filter(|e| e.date_label == DayLabel::Tomorrow).collect();
    assert_eq!(tomorrow.len(), 2);
    assert_eq!(tomorrow[0].treatment_date, "2026-10-17");
    assert_eq!(tomorrow[0].emoji, "🫏");
    assert_eq!(tomorrow[0].animal_type, "חמור");
}

#[tokio::test]
async fn board_skips_sheets_outside_lookback() {
    let f = facility().await;
    f.store.set_modified(&f.max, Utc::now() - ChronoDuration::days(30));

    let board = schedule::daily_board(&f.store, &f.store, &f.config, &options(), today(), Utc::now()).await;
    assert!(board.entries.iter().all(|e| e.animal_name != "Max"));
}

#[tokio::test]
async fn board_with_unbounded_lookback_reads_every_sheet() {
    let f = facility().await;
    f.store.set_modified(&f.max, Utc::now() - ChronoDuration::days(3000));
    let options = ScheduleOptions {
        lookback_days: i64::MAX,
        ..options()
    };

    let board = schedule::daily_board(&f.store, &f.store, &f.config, &options, today(), Utc::now()).await;
    assert!(board.entries.iter().any(|e| e.animal_name == "Max"));
}

#[tokio::test(start_paused = true)]
async fn board_pauses_before_each_day_scan() {
    let f = facility().await;
    let options = ScheduleOptions {
        scan_delay: Duration::from_secs(1),
        ..options()
    };

    let started = tokio::time::Instant::now();
    let board = schedule::daily_board(&f.store, &f.store, &f.config, &options, today(), Utc::now()).await;
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert!(!board.entries.is_empty());
}

#[tokio::test]
async fn board_survives_failing_scans() {
    let f = facility().await;
    f.store.fail_operation("list_documents");
    let board = schedule::daily_board(&f.store, &f.store, &f.config, &options(), today(), Utc::now()).await;
    assert!(board.entries.is_empty());
}

#[tokio::test]
async fn profile_window_filters_records() {
    let f = facility().await;
    f.store.push_row(&f.max, row(today() - ChronoDuration::days(8), ["FALSE", "", ""], "Old"));
    f.store.push_row(&f.max, row(today() + ChronoDuration::days(7), ["FALSE", "", ""], "Soon"));
    f.store.push_row(&f.max, vec!["not a date".into()]);

    let profile = schedule::profile(
        &f.store,
        &f.store,
        &f.config,
        &options(),
        AnimalType::Donkey,
        "Max",
        today(),
    )
    .await
    .unwrap();
    assert_eq!(profile.animal.chip_id, "900000000000001");
    let cases: Vec<&str> = profile.treatments.iter().map(|t| t.case.as_str()).collect();
    assert_eq!(cases, vec!["Checkup", "Soon"]);

    let missing = schedule::profile(
        &f.store,
        &f.store,
        &f.config,
        &options(),
        AnimalType::Donkey,
        "Ghost",
        today(),
    )
    .await;
    assert!(matches!(missing, Err(CareError::NotFound { entity: "animal", .. })));
}

#[tokio::test]
async fn replacing_a_course_deletes_the_submitted_span() {
    let f = facility().await;
    f.store.push_row(&f.max, row(today() + ChronoDuration::days(1), ["FALSE", "", ""], "Old course"));
    f.store.push_row(&f.max, row(today() + ChronoDuration::days(9), ["FALSE", "", ""], "Later"));

    let records: Vec<TreatmentRecord> = (0..3)
        .map(|d| TreatmentRecord {
            date: format_dmy(today() + ChronoDuration::days(d)),
            evening: SlotState::Pending,
            case: "New course".to_string(),
            ..Default::default()
        })
        .collect();

    let outcome = schedule::add_treatments(
        &f.store,
        &f.store,
        &f.config,
        AnimalType::Donkey,
        "Max",
        &records,
        DeleteMode::Submitted,
    )
    .await
    .unwrap();
    assert_eq!(outcome.rows_written, 3);
    assert_eq!(outcome.rows_deleted, 2);

    let cases: Vec<String> = f
        .store
        .rows(&f.max)
        .iter()
        .map(|r| r.get(10).map(CellValue::to_text).unwrap_or_default())
        .collect();
    assert_eq!(cases, vec!["Later", "New course", "New course", "New course"]);

    let missing = schedule::add_treatments(
        &f.store,
        &f.store,
        &f.config,
        AnimalType::Donkey,
        "Nobody",
        &records,
        DeleteMode::Keep,
    )
    .await;
    assert!(matches!(missing, Err(CareError::NotFound { entity: "treatment sheet", .. })));
}
