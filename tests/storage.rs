use std::fs;

use credkit::storage::{read_credentials, update_profile, write_credentials};

#[test]
fn update_rewrites_only_target_profile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials");
    write_credentials(
        &path,
        "[work]\naws_access_key_id = WORK\n[default]\naws_access_key_id = OLD\n",
    )
    .expect("seed");

    update_profile(
        &path,
        "default",
        &[("aws_access_key_id", "NEW"), ("aws_session_token", "T")],
    )
    .expect("update");

    assert_eq!(
        read_credentials(&path).expect("read back"),
        "[work]\naws_access_key_id = WORK\n[default]\naws_access_key_id = NEW\naws_session_token = T\n"
    );
}

#[test]
fn repeated_updates_are_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credentials");
    let fields = [("aws_access_key_id", "NEW")];

    update_profile(&path, "default", &fields).expect("first update");
    update_profile(&path, "default", &fields).expect("second update");
    let settled = fs::read_to_string(&path).expect("read back");
    update_profile(&path, "default", &fields).expect("third update");

    assert_eq!(fs::read_to_string(&path).expect("read back"), settled);
}

#[test]
fn unreadable_path_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    // a directory where the file should be
    assert!(read_credentials(dir.path()).is_err());
}
