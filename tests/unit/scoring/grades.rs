//! Unit tests for grade mapping

use report_card::scoring::{Grade, GradeTable};

#[test]
fn grade_lower_bounds_are_inclusive() {
    let table = GradeTable::default();

    assert_eq!(table.grade_for(74.9).letter, "B+");
    assert_eq!(table.grade_for(70.0).letter, "B+");
    assert_eq!(table.grade_for(69.9).letter, "B");
    assert_eq!(table.grade_for(90.0).letter, "A+");
    assert_eq!(table.grade_for(100.0).letter, "A+");
}

#[test]
fn lowest_grade_catches_everything_below() {
    let table = GradeTable::default();

    assert_eq!(table.grade_for(0.0).letter, "F");
    assert_eq!(table.grade_for(29.9).numeric, 1);
    assert_eq!(table.grade_for(-5.0).letter, "F");
}

#[test]
fn numeric_grades_map_back_to_letters() {
    let table = GradeTable::default();

    assert_eq!(table.letter_for(table.grade_for(85.0).numeric), Some("A"));
    assert_eq!(table.letter_for(99), None);
}

#[test]
fn custom_tables_are_sorted_from_highest_minimum() {
    let table = GradeTable::new(vec![
        Grade::new(0.0, "fail", 0),
        Grade::new(50.0, "pass", 1),
    ])
    .expect("non-empty table");

    assert_eq!(table.grades()[0].letter, "pass");
    assert_eq!(table.grade_for(50.0).letter, "pass");
    assert_eq!(table.grade_for(49.9).letter, "fail");
    assert!(GradeTable::new(vec![]).is_err());
}

#[test]
fn empty_table_cannot_be_deserialized() {
    assert!(serde_json::from_str::<GradeTable>("[]").is_err());
}

#[test]
fn deserialized_table_is_sorted_like_a_constructed_one() {
    let json = r#"[
        {"min_score": 0.0, "letter": "Fail", "numeric": 1},
        {"min_score": 50.0, "letter": "Pass", "numeric": 2}
    ]"#;

    let table: GradeTable = serde_json::from_str(json).expect("valid table");

    assert_eq!(table.grade_for(75.0).letter, "Pass");
    assert_eq!(table.grade_for(10.0).letter, "Fail");
    assert_eq!(table.grades()[0], Grade::new(50.0, "Pass", 2));
}
