use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `edir` running in `dir` with `editor` as its editor and git disabled.
fn edir(dir: &TempDir, editor: &str) -> Command {
    let mut cmd = Command::cargo_bin("edir").unwrap();
    cmd.current_dir(dir.path())
        .env("EDIR_EDITOR", editor)
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("VISUAL")
        .env_remove("EDITOR")
        .arg("-G")
        .arg("--no-color")
        .write_stdin("");
    cmd
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

fn actions_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("edir-actions-")
        })
        .collect()
}

#[test]
fn renames_a_file() {
    let dir = workspace(&[("a", "A"), ("b", "B")]);
    edir(&dir, r"sed -i -e 's|\./a$|./c|'")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"Renamed  "a"  →  "c""#));
    assert_eq!(read(&dir, "c"), "A");
    assert_eq!(read(&dir, "b"), "B");
    assert!(!dir.path().join("a").exists());
}

#[test]
fn swaps_two_files() {
    let dir = workspace(&[("a", "A"), ("b", "B")]);
    edir(&dir, r"sed -i -e 's|\./a$|./x|' -e 's|\./b$|./a|' -e 's|\./x$|./b|'")
        .assert()
        .success();
    assert_eq!(read(&dir, "a"), "B");
    assert_eq!(read(&dir, "b"), "A");
    assert!(!dir.path().join(".tmp-edir").exists());
}

#[test]
fn deletes_removed_lines() {
    let dir = workspace(&[("keep", "1"), ("drop", "2")]);
    edir(&dir, r"sed -i -e '/drop$/d'")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"Deleted  "drop""#));
    assert!(dir.path().join("keep").exists());
    assert!(!dir.path().join("drop").exists());
}

#[test]
fn unchanged_listing_does_nothing() {
    let dir = workspace(&[("a", "A")]);
    edir(&dir, "true")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(read(&dir, "a"), "A");
}

#[test]
fn malformed_listing_changes_nothing() {
    let dir = workspace(&[("a", "A"), ("b", "B")]);
    edir(&dir, r"sed -i -e '1s/^1/x/' -e 's|\./b$|./c|'")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not start with a number"));
    assert_eq!(read(&dir, "a"), "A");
    assert_eq!(read(&dir, "b"), "B");
    assert!(!dir.path().join("c").exists());
}

#[test]
fn failing_editor_is_fatal() {
    let dir = workspace(&[("a", "A")]);
    edir(&dir, "false")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("editor failed"));
    assert!(dir.path().join("a").exists());
}

#[test]
fn empty_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    edir(&dir, "false")
        .assert()
        .success()
        .stdout("No files or directories.\n");
}

#[test]
fn paths_from_stdin() {
    let dir = workspace(&[("a", "A"), ("b", "B")]);
    edir(&dir, r"sed -i -e 's|\./b$|./c|'")
        .write_stdin("b\n")
        .assert()
        .success();
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("c").exists());
}

#[test]
fn quiet_suppresses_successes() {
    let dir = workspace(&[("a", "A")]);
    edir(&dir, r"sed -i -e 's|\./a$|./b|'")
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("b").exists());
}

#[test]
fn flags_file_is_applied() {
    let dir = workspace(&[("a", "A"), ("config/edir-flags.conf", "# defaults\n-q\n")]);
    edir(&dir, r"sed -i -e 's|\./a$|./b|'")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("b").exists());
}

#[test]
fn hidden_files_need_all() {
    let dir = workspace(&[(".hidden", "H")]);
    edir(&dir, "false").assert().success().stdout("No files or directories.\n");
    edir(&dir, r"sed -i -e 's|\./\.hidden$|./shown|'")
        .arg("-a")
        .assert()
        .success();
    assert!(dir.path().join("shown").exists());
}

#[test]
fn moves_into_new_directory() {
    let dir = workspace(&[("a", "A")]);
    edir(&dir, r"sed -i -e 's|\./a$|./sub/deeper/a|'")
        .assert()
        .success();
    assert_eq!(read(&dir, "sub/deeper/a"), "A");
}

#[test]
fn failed_delete_writes_replayable_actions_file() {
    let dir = workspace(&[("d/f", "F")]);
    edir(&dir, r"sed -i -e '/d\/$/d'")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Directory not empty"))
        .stderr(predicate::str::contains("ACTIONS FILE: "));
    assert!(dir.path().join("d/f").exists());

    let written = actions_files(dir.path());
    assert_eq!(written.len(), 1);
    let text = fs::read_to_string(&written[0]).unwrap();
    assert!(text.lines().any(|line| line == "d ./d"));

    edir(&dir, "false")
        .arg("-r")
        .arg("-i")
        .arg(&written[0])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"Deleted  "d/" recursively"#));
    assert!(!dir.path().join("d").exists());
}

#[test]
fn recursive_delete() {
    let dir = workspace(&[("d/f", "F"), ("e", "E")]);
    edir(&dir, r"sed -i -e '/d\/$/d'")
        .arg("-r")
        .assert()
        .success();
    assert!(!dir.path().join("d").exists());
    assert!(dir.path().join("e").exists());
}

#[test]
fn missing_trash_program_is_fatal() {
    let dir = workspace(&[("a", "A")]);
    edir(&dir, r"sed -i -e '/a$/d'")
        .args(["-t", "--trash-program", "edir-no-such-trash-program"])
        .assert()
        .code(2);
    assert!(dir.path().join("a").exists());
}

#[test]
fn files_and_dirs_filters() {
    let dir = workspace(&[("d/f", "F"), ("e", "E")]);
    edir(&dir, r"sed -i -e 's|\./e$|./g|'")
        .arg("-F")
        .assert()
        .success();
    assert!(dir.path().join("g").exists());

    edir(&dir, r"sed -i -e 's|\./d/$|./h/|'")
        .arg("-D")
        .assert()
        .success();
    assert!(dir.path().join("h/f").exists());
}
