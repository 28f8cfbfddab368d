mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{AGE_CITY_CSV, TestWorkspace, parse_table_row};

#[test]
fn preview_renders_the_first_rows() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write(
        "people.csv",
        "name,age\nAlice,30\nBob,40\nCarol,50\nDave,60\nEve,70\nFrank,80\n",
    );

    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["preview", "-i", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("name").and(contains("Alice")).and(contains("Eve")));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    assert!(
        !stdout.contains("Frank"),
        "default preview should stop at five rows: {stdout}"
    );
}

#[test]
fn preview_honors_the_rows_flag() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("people.csv", "name\nAlice\nBob\nCarol\n");

    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["preview", "-i", csv_path.to_str().unwrap(), "--rows", "1"])
        .assert()
        .success()
        .stdout(contains("Alice").and(contains("Bob").not()));
}

#[test]
fn stats_profiles_the_majority_numeric_column() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("ages.csv", AGE_CITY_CSV);

    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["stats", "-i", csv_path.to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let age_line = stdout
        .lines()
        .find(|line| line.starts_with("age"))
        .expect("age row present");
    let cells = parse_table_row(age_line);
    assert_eq!(cells, ["age", "2", "35", "30", "40", "35"]);
    assert!(
        !stdout.contains("city"),
        "categorical column should not be profiled: {stdout}"
    );
}

#[test]
fn stats_rejects_a_categorical_column_request() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("ages.csv", AGE_CITY_CSV);

    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args([
            "stats",
            "-i",
            csv_path.to_str().unwrap(),
            "--columns",
            "city",
        ])
        .assert()
        .failure()
        .stderr(contains("city").and(contains("categorical")));
}

#[test]
fn stats_fails_on_a_dataset_with_no_rows() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("empty.csv", "age,city\n");

    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["stats", "-i", csv_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("no rows"));
}

#[test]
fn stats_limit_restricts_scanned_rows() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("values.csv", "v\n1\n2\n3\n4\n5\n6\n");

    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["stats", "-i", csv_path.to_str().unwrap(), "--limit", "2"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let line = stdout
        .lines()
        .find(|line| line.starts_with('v'))
        .expect("value row present");
    let cells = parse_table_row(line);
    assert_eq!(cells[1], "2", "limit should restrict to two rows");
    assert_eq!(cells[2], "1.5000", "mean should reflect the scanned rows only");
}

#[test]
fn jagged_rows_are_reported_as_parse_errors() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("jagged.csv", "a,b\n1,2\n3\n");

    Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["stats", "-i", csv_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Reading dataset"));
}

#[test]
fn tsv_extension_switches_the_delimiter() {
    let workspace = TestWorkspace::new();
    let csv_path = workspace.write("scores.tsv", "name\tscore\nAlice\t10\nBob\t20\n");

    let assert = Command::cargo_bin("csv-insight")
        .expect("binary exists")
        .args(["stats", "-i", csv_path.to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let line = stdout
        .lines()
        .find(|line| line.starts_with("score"))
        .expect("score row present");
    let cells = parse_table_row(line);
    assert_eq!(cells[2], "15");
}
