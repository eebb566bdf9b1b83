use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

use report_spec::QuestionKey;

const CONFIG: &str = r#"
[[directory.companies]]
id = "c-001"
name = "Universal Logistics"
contact = "office@ul.example"
responsible_person = "Marko Marković"

[export]
output_dir = "izvestaji"
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("bzr-report.toml").write_str(CONFIG).unwrap();
    dir
}

fn bzr(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bzr-report").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn new_report(dir: &TempDir) {
    bzr(dir)
        .args(["new", "--company", "c-001", "--date", "2024-05-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Universal Logistics"));
}

fn answer(dir: &TempDir, key: QuestionKey, value: &str) -> assert_cmd::assert::Assert {
    bzr(dir)
        .args(["answer", "report.json", key.as_str(), value])
        .assert()
}

fn answer_all_no(dir: &TempDir) {
    for key in QuestionKey::ALL {
        answer(dir, key, "ne").success();
    }
}

#[test]
fn scenario_a_fills_saves_and_exports() {
    let dir = workspace();
    new_report(&dir);
    answer_all_no(&dir);
    answer(&dir, QuestionKey::StazeZaKomunikacijuBezbedne, "da")
        .success()
        .stdout(predicate::str::contains("explanation required"));
    bzr(&dir)
        .args([
            "note",
            "report.json",
            "stazeZaKomunikacijuBezbedne",
            "Sve staze su prohodne i bezbedne.",
        ])
        .assert()
        .success();

    bzr(&dir)
        .args(["validate", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report is complete"));
    bzr(&dir)
        .args(["rows", "report.json", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sve staze su prohodne i bezbedne."));
    bzr(&dir).args(["save", "report.json"]).assert().success();
    dir.child("report.json")
        .assert(predicate::str::contains(r#""status": "saved""#));

    bzr(&dir)
        .args(["export", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dnevni_izvestaj_2024-05-14.pdf"));
    dir.child("izvestaji/Dnevni_izvestaj_2024-05-14.pdf")
        .assert(predicate::path::is_file());
}

#[test]
fn scenario_b_missing_sub_form_blocks_export() {
    let dir = workspace();
    new_report(&dir);
    answer_all_no(&dir);
    answer(&dir, QuestionKey::NovaSredstvaZaRad, "da")
        .success()
        .stdout(predicate::str::contains("Obrazac sredstava za rad"));

    bzr(&dir)
        .args(["validate", "report.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("(form not completed)"));
    bzr(&dir)
        .args(["export", "report.json", "--out-dir", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("(form not completed)"));
    dir.child("out").assert(predicate::path::missing());
    bzr(&dir)
        .args(["save", "report.json"])
        .assert()
        .failure();

    dir.child("payload.json")
        .write_str(r#"[{"label": "Naziv", "value": "Viljuškar"}]"#)
        .unwrap();
    bzr(&dir)
        .args([
            "form",
            "report.json",
            "novaSredstvaZaRad",
            "--payload",
            "payload.json",
        ])
        .assert()
        .success();
    bzr(&dir)
        .args(["validate", "report.json"])
        .assert()
        .success();
}

#[test]
fn withdrawing_answer_reports_cleared_note() {
    let dir = workspace();
    new_report(&dir);
    answer(&dir, QuestionKey::OpasneMaterije, "da").success();
    bzr(&dir)
        .args(["note", "report.json", "opasneMaterije", "Boje u magacinu"])
        .assert()
        .success();
    answer(&dir, QuestionKey::OpasneMaterije, "ne")
        .success()
        .stdout(predicate::str::contains("explanation cleared"));
    dir.child("report.json")
        .assert(predicate::str::contains("Boje u magacinu").not());
}

#[test]
fn scenario_c_review_after_save() {
    let dir = workspace();
    new_report(&dir);
    answer_all_no(&dir);
    bzr(&dir).args(["save", "report.json"]).assert().success();

    answer(&dir, QuestionKey::OpasneMaterije, "da")
        .failure()
        .stderr(predicate::str::contains("may not edit"));
    bzr(&dir)
        .args(["review", "report.json", "--note", "Pregledano bez primedbi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(reviewed)"));

    bzr(&dir)
        .args(["print", "report.json", "--role", "komitent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pregledano bez primedbi"))
        .stdout(predicate::str::contains("<!DOCTYPE html>"));
}

#[test]
fn reviewer_cannot_review_a_draft() {
    let dir = workspace();
    new_report(&dir);
    answer_all_no(&dir);
    bzr(&dir)
        .args(["review", "report.json"])
        .assert()
        .failure();
}

#[test]
fn unknown_company_is_rejected() {
    let dir = workspace();
    bzr(&dir)
        .args(["new", "--company", "c-404", "--date", "2024-05-14"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("c-404"));
    dir.child("report.json").assert(predicate::path::missing());
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    bzr(&dir)
        .args([
            "--config",
            "nope.toml",
            "new",
            "--company",
            "c-001",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}
