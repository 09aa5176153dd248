use oxibps::bps::PatchEncoder;
use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxibps").to_string()
}

#[test]
fn cli_create_apply_roundtrip() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    let output = dir.path().join("output.bin");

    std::fs::write(&source, b"abcde12345abcde12345").unwrap();
    std::fs::write(&target, b"abcdeXXXXXabcde12345!").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(&std::fs::read(&patch).unwrap()[..4], b"BPS1");

    let st = Command::new(bin())
        .arg("apply")
        .arg(&source)
        .arg(&patch)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&target).unwrap()
    );
}

#[test]
fn cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    std::fs::write(&source, b"old contents").unwrap();
    std::fs::write(&target, b"new contents").unwrap();
    std::fs::write(&patch, b"keep me").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&patch).unwrap(), b"keep me");

    let st = Command::new(bin())
        .arg("-f")
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(&std::fs::read(&patch).unwrap()[..4], b"BPS1");
}

#[test]
fn cli_apply_wrong_source_fails() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let other = dir.path().join("other.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    let output = dir.path().join("output.bin");
    std::fs::write(&source, b"the real source").unwrap();
    std::fs::write(&other, b"a fake source!!").unwrap();
    std::fs::write(&target, b"the real target").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin())
        .arg("apply")
        .arg(&other)
        .arg(&patch)
        .arg(&output)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("checksum"));
    assert!(!output.exists());
}

#[test]
fn cli_info_and_ops() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    std::fs::write(&source, b"AAAA").unwrap();
    std::fs::write(&target, b"AAAAAAAA").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .args(["--metadata", "title=demo"])
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin()).arg("info").arg(&patch).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("title=demo"), "{stdout}");
    assert!(stdout.contains("(ok)"), "{stdout}");

    let out = Command::new(bin()).arg("ops").arg(&patch).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("SourceRead"), "{stdout}");
    assert!(stdout.contains("SourceCopy"), "{stdout}");
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    std::fs::write(&source, b"").unwrap();
    std::fs::write(&target, b"HELLO").unwrap();

    let out = Command::new(bin())
        .arg("--json")
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(stats["command"], "create");
    assert_eq!(stats["target_size"], 5);
    assert_eq!(stats["operations"]["target_read"], 1);
    assert_eq!(stats["literal_bytes"], 5);
}

#[test]
fn cli_info_rejects_garbage() {
    let dir = tempdir().unwrap();
    let patch = dir.path().join("garbage.bps");
    std::fs::write(&patch, b"definitely not a patch file").unwrap();
    let out = Command::new(bin()).arg("info").arg(&patch).output().unwrap();
    assert!(!out.status.success());
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("MIN_MATCH=4"));
}

#[test]
fn cli_ops_reports_failing_offset() {
    let dir = tempdir().unwrap();
    let patch = dir.path().join("broken.bps");
    // The second operation reads past the end of the 4-byte source.
    let mut enc = PatchEncoder::new(4, 4, &[]);
    enc.source_read(2);
    enc.source_copy(3, 2);
    std::fs::write(&patch, enc.finish(b"abcd", b"abdd")).unwrap();

    let out = Command::new(bin()).arg("ops").arg(&patch).output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("operation 1 (target offset 2)"), "{stderr}");
}

#[test]
fn cli_apply_honours_max_target_size() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.bin");
    let target = dir.path().join("target.bin");
    let patch = dir.path().join("patch.bps");
    let output = dir.path().join("output.bin");
    std::fs::write(&source, b"").unwrap();
    std::fs::write(&target, b"0123456789").unwrap();

    let st = Command::new(bin())
        .arg("create")
        .arg(&source)
        .arg(&target)
        .arg(&patch)
        .status()
        .unwrap();
    assert!(st.success());

    let out = Command::new(bin())
        .arg("apply")
        .arg(&source)
        .arg(&patch)
        .arg(&output)
        .args(["--max-target-size", "9"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("exceeds limit"));
    assert!(!output.exists());

    let st = Command::new(bin())
        .arg("apply")
        .arg(&source)
        .arg(&patch)
        .arg(&output)
        .args(["--max-target-size", "10"])
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"0123456789");
}
