use test_util::{home_fixture, run_tarsh};

#[test]
fn script_mode_runs_commands_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tar = home_fixture(dir.path());
    let log = dir.path().join("log.csv");
    let (code, out, _err) = run_tarsh(
        &["--archive", tar.to_str().unwrap(), "--log", log.to_str().unwrap(), "--host", "MyComputer",
          "-c", "uname; cd /home/user/docs; head /home/user/readme.txt 1; exit; uname"],
        "",
    );
    assert_eq!(code, 0);
    assert_eq!(out, "MyComputer\nChanged directory to /home/user/docs\nHello\nExiting shell...\n");
    let text = std::fs::read_to_string(&log).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.trim_end().ends_with(",exit,"));
}

#[test]
fn repl_reads_until_exit() {
    let dir = tempfile::tempdir().unwrap();
    let tar = home_fixture(dir.path());
    let log = dir.path().join("log.csv");
    let cfg = dir.path().join("config.json");
    std::fs::write(&cfg, format!(
        r#"{{"computer_name":"box","fs_archive":{:?},"log_file":{:?},"listing":"children"}}"#,
        tar.to_str().unwrap(), log.to_str().unwrap(),
    )).unwrap();
    let (code, out, _err) = run_tarsh(&["--config", cfg.to_str().unwrap()], "ls\ncd /home/user/docs\nexit\nuname\n");
    assert_eq!(code, 0);
    assert_eq!(
        out,
        "box:/home/user$ /home/user\n/home/user/docs\n/home/user/readme.txt\n\
         box:/home/user$ Changed directory to /home/user/docs\n\
         box:/home/user/docs$ Exiting shell...\n"
    );
    assert!(log.exists());
}

#[test]
fn repl_eof_does_not_log() {
    let dir = tempfile::tempdir().unwrap();
    let tar = home_fixture(dir.path());
    let log = dir.path().join("log.csv");
    let (code, out, _err) = run_tarsh(&["--archive", tar.to_str().unwrap(), "--log", log.to_str().unwrap(), "--host", "h"], "uname\n");
    assert_eq!(code, 0);
    assert_eq!(out, "h:/home/user$ h\nh:/home/user$ \n");
    assert!(!log.exists());
}

#[test]
fn missing_host_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let tar = home_fixture(dir.path());
    let log = dir.path().join("log.csv");
    let (code, out, err) = run_tarsh(&["--archive", tar.to_str().unwrap(), "--log", log.to_str().unwrap(), "-c", "uname"], "");
    assert_ne!(code, 0);
    assert!(out.is_empty());
    assert!(err.contains("host identity is not configured"), "{err}");
}

#[test]
fn archive_and_log_are_required_without_config() {
    let (code, _out, err) = run_tarsh(&["-c", "uname"], "");
    assert_ne!(code, 0);
    assert!(err.contains("--config"), "{err}");
}
