//! Specs for the gatekeeper and seed harvesting preconditions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::prelude::*;

/// A patch touching no supported pass prints "Not interesting",
/// exits 0, and never creates the work directory.
#[cfg(unix)]
#[test]
fn uninteresting_patch_is_skipped() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(
        "diff --git a/llvm/lib/CodeGen/SelectionDAG.cpp b/llvm/lib/CodeGen/SelectionDAG.cpp\n\
         +// nfc\n",
    );

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("Not interesting"));

    assert!(!world.work_dir().exists());
}

/// A patch in a pass's test directory that mentions no function prints
/// "No seeds found" and exits 0.
#[cfg(unix)]
#[test]
fn patch_without_functions_has_no_seeds() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(
        "diff --git a/llvm/test/Transforms/InstCombine/add.ll b/llvm/test/Transforms/InstCombine/add.ll\n\
         +; just a comment\n",
    );

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("No seeds found"));
}

/// A missing tool binary is a setup failure (non-zero exit).
#[cfg(unix)]
#[test]
fn missing_tool_is_fatal() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    std::fs::remove_file(world.bin.join("mutate")).unwrap();
    world.set_patch(INSTCOMBINE_PATCH);

    world
        .patch_cmd()
        .assert()
        .failure()
        .stderr(predicates::str::contains("mutate"));
}

/// An unreadable patch aborts the run with a non-zero exit.
#[cfg(unix)]
#[test]
fn missing_patch_is_fatal() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    std::fs::remove_file(&world.patch).unwrap();

    world.patch_cmd().assert().failure();
}
