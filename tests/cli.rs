use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_addon(dir: &Path) {
    fs::write(
        dir.join("addon.xml"),
        r#"<?xml version="1.0" encoding="UTF-8"?>
<addon id="plugin.video.invidious" name="Invidious" version="2.0.4" provider-name="kodipack">
  <extension point="xbmc.python.pluginsource" library="main.py"/>
</addon>
"#,
    )
    .unwrap();
    fs::write(dir.join("main.py"), "from resources.lib import plugin\n").unwrap();
    fs::write(dir.join("LICENSE.txt"), "MIT\n").unwrap();
    fs::create_dir_all(dir.join("resources/lib/__pycache__")).unwrap();
    fs::write(dir.join("resources/lib/invidious_api.py"), "API = 1\n").unwrap();
    fs::write(dir.join("resources/lib/__pycache__/invidious_api.pyc"), [0u8]).unwrap();
}

fn kodipack(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kodipack").unwrap();
    cmd.current_dir(dir)
        .env_remove("REPO_PLUGINS")
        .env_remove("RELEASE_BRANCH")
        .env_remove("KODIPACK_CLI_VERSION");
    cmd
}

fn archive_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(|s| s.to_string()).collect();
    names.sort();
    names
}

#[test]
fn default_command_builds_archive() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());

    kodipack(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin.video.invidious-2.0.4.zip"));

    let zip = tmp.path().join("plugin.video.invidious-2.0.4.zip");
    assert_eq!(
        archive_names(&zip),
        vec![
            "plugin.video.invidious/LICENSE.txt",
            "plugin.video.invidious/addon.xml",
            "plugin.video.invidious/main.py",
            "plugin.video.invidious/resources/lib/invidious_api.py",
        ]
    );
}

#[test]
fn dist_with_dir_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let addon = tmp.path().join("addon");
    fs::create_dir_all(&addon).unwrap();
    write_addon(&addon);

    kodipack(tmp.path())
        .args(["dist", "--dir", "addon"])
        .assert()
        .success();
    assert!(addon.join("plugin.video.invidious-2.0.4.zip").is_file());
}

#[test]
fn dist_fails_on_missing_path() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());
    fs::remove_file(tmp.path().join("LICENSE.txt")).unwrap();

    kodipack(tmp.path())
        .arg("dist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LICENSE.txt"));
    assert!(!tmp.path().join("plugin.video.invidious-2.0.4.zip").exists());
}

#[test]
fn config_file_controls_file_list() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());
    fs::write(
        tmp.path().join("kodipack.toml"),
        "[package]\nfiles = [\"addon.xml\", \"main.py\"]\n",
    )
    .unwrap();

    kodipack(tmp.path()).arg("dist").assert().success();
    assert_eq!(
        archive_names(&tmp.path().join("plugin.video.invidious-2.0.4.zip")),
        vec![
            "plugin.video.invidious/addon.xml",
            "plugin.video.invidious/main.py",
        ]
    );
}

#[test]
fn clean_removes_only_zips() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());
    fs::write(tmp.path().join("old-1.0.0.zip"), "x").unwrap();
    fs::write(tmp.path().join("other-0.1.zip"), "x").unwrap();

    kodipack(tmp.path())
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 archive(s)"));
    assert!(!tmp.path().join("old-1.0.0.zip").exists());
    assert!(!tmp.path().join("other-0.1.zip").exists());
    assert!(tmp.path().join("addon.xml").exists());
    assert!(tmp.path().join("main.py").exists());
}

#[test]
fn info_prints_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());

    kodipack(tmp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin.video.invidious"))
        .stdout(predicate::str::contains("2.0.4"))
        .stdout(predicate::str::contains("nexus"));
}

#[test]
fn bump_updates_manifest_version() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());

    kodipack(tmp.path()).args(["bump", "patch"]).assert().success();
    let text = fs::read_to_string(tmp.path().join("addon.xml")).unwrap();
    assert!(text.contains(r#"version="2.0.5""#));
    assert!(text.contains(r#"<?xml version="1.0""#));

    kodipack(tmp.path()).args(["bump", "sideways"]).assert().failure();
}

#[test]
fn release_env_variables_are_honoured() {
    let tmp = tempfile::tempdir().unwrap();
    write_addon(tmp.path());
    let not_a_repo = tmp.path().join("plain-dir");
    fs::create_dir_all(&not_a_repo).unwrap();

    // Points at a directory that is not a git checkout, so staging must stop.
    kodipack(tmp.path())
        .arg("release")
        .env("REPO_PLUGINS", &not_a_repo)
        .env("RELEASE_BRANCH", "omega")
        .assert()
        .failure();
    assert!(!not_a_repo.join("plugin.video.invidious").exists());
}

#[test]
fn version_flag_prints_banner() {
    let tmp = tempfile::tempdir().unwrap();
    kodipack(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kodipack"));
}

#[test]
fn missing_manifest_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    kodipack(tmp.path())
        .arg("dist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest not found"));
}
