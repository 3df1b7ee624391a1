use assert_cmd::Command;
use predicates::prelude::*;
use rstest::*;
use tempfile::NamedTempFile;

fn cmd(db: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("bkmr-ingest").unwrap();
    cmd.arg("--db-url").arg(db.path());
    cmd
}

#[rstest]
fn given_new_db_when_add_then_bookmark_is_persisted() {
    let db = NamedTempFile::new().unwrap();

    cmd(&db)
        .args(["add", "https://example.com", "-t", "Example", "-T", "rust,web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com"));

    cmd(&db)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Example"));
}

#[rstest]
fn given_duplicate_url_when_add_twice_then_second_call_fails() {
    let db = NamedTempFile::new().unwrap();

    cmd(&db)
        .args(["add", "https://example.com"])
        .assert()
        .success();

    cmd(&db)
        .args(["add", "https://example.com"])
        .assert()
        .failure();
}

#[rstest]
fn given_bookmark_when_get_by_id_then_prints_it() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://example.com", "-t", "Example"])
        .assert()
        .success();

    cmd(&db)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Example"));
}

#[rstest]
fn given_unknown_id_when_get_then_operational_error() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db).args(["get", "999"]).assert().failure().code(1);
}

#[rstest]
fn given_bookmark_when_update_then_title_changes() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://example.com", "-t", "Old"])
        .assert()
        .success();

    cmd(&db)
        .args(["update", "1", "-t", "New"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bookmark updated"));

    cmd(&db)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New"));
}

#[rstest]
fn given_bookmark_when_delete_then_no_longer_listed() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://example.com"])
        .assert()
        .success();

    cmd(&db).args(["delete", "1"]).assert().success();
    cmd(&db)
        .args(["get", "1"])
        .assert()
        .failure();
}

#[rstest]
fn given_tagged_bookmarks_when_tags_then_lists_distinct_tags() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://a.example", "-T", "rust,cli"])
        .assert()
        .success();
    cmd(&db)
        .args(["add", "https://b.example", "-T", "rust,web"])
        .assert()
        .success();

    cmd(&db)
        .args(["tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rust"))
        .stdout(predicate::str::contains("cli"))
        .stdout(predicate::str::contains("web"));
}

#[rstest]
fn given_tagged_bookmark_when_remove_tag_then_tag_dropped() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://a.example", "-T", "rust,cli"])
        .assert()
        .success();

    cmd(&db)
        .args(["tags", "--remove-from", "1", "--tag", "cli"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed tag"));
}

#[rstest]
fn given_bookmarks_when_purge_without_yes_then_refused() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://a.example"])
        .assert()
        .success();

    cmd(&db).args(["purge"]).assert().failure().code(2);

    cmd(&db)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bookmarks: 1"));
}

#[rstest]
fn given_bookmarks_when_purge_with_yes_then_removed_and_ids_reset() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://a.example"])
        .assert()
        .success();

    cmd(&db).args(["purge", "--yes"]).assert().success();

    cmd(&db)
        .args(["add", "https://b.example"])
        .assert()
        .success();

    cmd(&db)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://b.example"));
}

#[rstest]
fn given_bookmark_when_search_then_matches_substring() {
    let db = NamedTempFile::new().unwrap();
    cmd(&db)
        .args(["add", "https://example.com", "-t", "Rust Blog"])
        .assert()
        .success();

    cmd(&db)
        .args(["search", "Blog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust Blog"));
}

#[rstest]
fn given_no_subcommand_when_run_then_prints_help() {
    let mut cmd = Command::cargo_bin("bkmr-ingest").unwrap();
    cmd.assert().failure();
}

#[rstest]
fn given_generate_config_flag_when_run_then_prints_toml() {
    let mut cmd = Command::cargo_bin("bkmr-ingest").unwrap();
    cmd.arg("--generate-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("db_url"));
}
