//! Specs for the five-recipe checklist and reproducer retention.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::prelude::*;

/// All five recipes pass on a clean patch: five ✅ lines plus the
/// preamble and footer.
#[cfg(unix)]
#[test]
fn clean_patch_passes_every_check() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("Seeds: 1"))
        .stdout(predicates::str::contains(
            "Pass: `opt -passes=instcombine<no-verify-fixpoint>`",
        ))
        .stdout(predicates::str::contains("Checklist:"))
        .stdout(predicates::str::contains("\u{2705} Correctness"))
        .stdout(predicates::str::contains("\u{2705} Commutative op handling"))
        .stdout(predicates::str::contains("\u{2705} Multi-use handling"))
        .stdout(predicates::str::contains("\u{2705} Flag preservation"))
        .stdout(predicates::str::contains("\u{2705} Canonical form handling"))
        .stdout(predicates::str::contains("Time: "));

    // No scratch files survive a clean run.
    for recipe in [
        "correctness",
        "commutative",
        "multi-use",
        "flag-preserving",
        "canonical-form",
    ] {
        assert!(world.stems(recipe).is_empty(), "{} left scratch", recipe);
    }
}

/// A rewrite the validator refutes fails the correctness check and
/// leaves exactly one reproducer stem on disk.
#[cfg(unix)]
#[test]
fn unsound_rewrite_fails_correctness() {
    let world = World::new("echo add 1", "echo 1 incorrect transformations");
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("\u{274c} Correctness"))
        .stdout(predicates::str::contains("\u{2705} Flag preservation"));

    let stems = world.stems("correctness");
    assert_eq!(stems.len(), 1, "one reproducer stem: {:?}", stems);
}

/// A commutative cost regression fails with a diagnostic naming the
/// regressing key.
#[cfg(unix)]
#[test]
fn cost_regression_fails_commutative() {
    // The reference costs one add; every mutated module costs two.
    let world = World::new(
        r#"case "$1" in *seeds_ref*) echo "add 1";; *) echo "add 2";; esac"#,
        "echo 0 incorrect transformations",
    );
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("\u{2705} Correctness"))
        .stdout(predicates::str::contains("\u{274c} Commutative op handling"))
        .stdout(predicates::str::contains("\u{274c} Canonical form handling"))
        // Multi-use compares the mutation to itself; equal costs pass.
        .stdout(predicates::str::contains("\u{2705} Multi-use handling"))
        .stdout(predicates::str::contains("is not optimized as well."));
}

/// An optimizer crash is a finding with the `crash` tag.
#[cfg(unix)]
#[test]
fn optimizer_crash_is_reported() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    // The reference preparation itself needs opt to succeed, so crash
    // only on mutated inputs.
    write_script(
        &world.bin,
        "opt",
        r#"case "$4" in *seeds.ll) cp "$4" "$3";; *) exit 2;; esac"#,
    );

    world
        .patch_cmd()
        .assert()
        .success()
        .stdout(predicates::str::contains("\u{274c} Correctness"))
        .stdout(predicates::str::contains("crash"));
}

/// The JSON summary carries the preamble and one entry per recipe.
#[cfg(unix)]
#[test]
fn json_summary_lists_all_checks() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    let output = world
        .patch_cmd()
        .args(["-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["seeds"], 1);
    assert_eq!(json["pass_spec"], "instcombine<no-verify-fixpoint>");
    let checks = json["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 5);
    assert!(checks.iter().all(|c| c["passed"] == true));
}

/// Display-only environment variables surface in the preamble.
#[cfg(unix)]
#[test]
fn preamble_reports_patch_provenance() {
    let world = World::new("echo add 1", "echo 0 incorrect transformations");
    world.set_patch(INSTCOMBINE_PATCH);
    world.add_source_file("llvm/test/Transforms/InstCombine/add.ll", INSTCOMBINE_TEST);

    world
        .patch_cmd()
        .env("LLVM_REVISION", "deadbeef")
        .env("COMMIT_URL", "https://example.com/patch")
        .env("PATCH_SHA256", "cafe")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Baseline: https://github.com/llvm/llvm-project/commit/deadbeef",
        ))
        .stdout(predicates::str::contains(
            "Patch URL: https://example.com/patch",
        ))
        .stdout(predicates::str::contains("Patch SHA256: cafe"));
}
