//! Specs for directory-driven fuzzing.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::prelude::*;

#[cfg(unix)]
fn dir_world() -> (World, std::path::PathBuf) {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    let tests = world.cwd.join("ll-tests");
    std::fs::create_dir(&tests).unwrap();
    std::fs::write(tests.join("add.ll"), INSTCOMBINE_TEST).unwrap();
    std::fs::write(tests.join("notes.txt"), "not a test").unwrap();
    // Block-listed: must not become a candidate.
    std::fs::write(tests.join("fneg-fabs.ll"), INSTCOMBINE_TEST).unwrap();
    (world, tests)
}

#[cfg(unix)]
fn dir_cmd(world: &World, tests: &std::path::Path, count: &str) -> std::process::Command {
    let mut cmd = optfuzz_cmd();
    let path = std::env::var("PATH").unwrap_or_default();
    cmd.current_dir(&world.cwd)
        .env("PATH", format!("{}:{}", world.bin.display(), path))
        .arg("dir")
        .arg(world.bin.join("alive-tv"))
        .arg(&world.bin)
        .arg(&world.bin)
        .arg(tests)
        .arg(count)
        .arg("--no-progress");
    cmd
}

/// Block-listed and non-`.ll` files are filtered; the rest prepare.
#[cfg(unix)]
#[test]
fn counts_valid_tests() {
    let (world, tests) = dir_world();

    dir_cmd(&world, &tests, "8")
        .assert()
        .success()
        .stdout(predicates::str::contains("Valid tests: 1"));
}

/// A clean run completes every trial, leaves no scratch, and exits 0.
#[cfg(unix)]
#[test]
fn clean_run_leaves_no_scratch() {
    let (world, tests) = dir_world();

    dir_cmd(&world, &tests, "8").assert().success();
    assert!(world.stems("correctness").is_empty());
}

/// A validator rejection reports the trial and its seed, still exit 0,
/// and at most one reproducer stem survives on disk.
#[cfg(unix)]
#[test]
fn finding_reports_trial_and_seed() {
    let (world, tests) = dir_world();
    write_script(&world.bin, "alive-tv", "echo 1 incorrect transformations");

    dir_cmd(&world, &tests, "8")
        .assert()
        .success()
        .stdout(predicates::str::contains("correctness"))
        .stdout(predicates::str::contains("seed.ll"));

    // Every trial in the batch was interesting; retention prunes to one.
    assert_eq!(world.stems("correctness").len(), 1);
}

/// An empty test directory is reported and the run still exits 0.
#[cfg(unix)]
#[test]
fn empty_directory_is_not_an_error() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    let tests = world.cwd.join("empty");
    std::fs::create_dir(&tests).unwrap();

    dir_cmd(&world, &tests, "4")
        .assert()
        .success()
        .stdout(predicates::str::contains("Valid tests: 0"));
}
