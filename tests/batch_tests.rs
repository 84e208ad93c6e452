//! End-to-end batch tests against a mock munkipkg.
//!
//! All tests are serial: they exec freshly written scripts, and a parallel
//! fork holding the script open for writing makes exec fail with ETXTBSY.

mod helpers;

use std::fs;
use std::os::unix::fs::MetadataExt;

use helpers::{assert_file_exists, assert_missing, create_project, mark, TestEnv};
use munkibatch::batch::PackageStatus;
use munkibatch::config::Config;
use serial_test::serial;

#[test]
#[serial]
fn test_target_project_is_built_alone() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");
    // A nested project must not be picked up when the target itself qualifies.
    create_project(&env.source.join("Nested"), "json");

    let summary = env.batch(env.config()).run().unwrap();

    assert_eq!(summary.packages.len(), 1);
    assert_eq!(summary.packages[0].dir, env.source);
    assert_eq!(env.calls().len(), 2);
    assert_missing(&env.source.join("Nested/build"));
    assert_file_exists(&env.central_build().join("source-1.0.pkg"));
}

#[test]
#[serial]
fn test_scan_builds_each_qualifying_subdirectory() {
    let env = TestEnv::new();
    create_project(&env.source.join("Alpha"), "plist");
    create_project(&env.source.join("Beta"), "yml");
    fs::create_dir_all(env.source.join("NotAPackage/payload")).unwrap();
    fs::write(env.source.join("README.md"), "").unwrap();

    let summary = env.batch(env.config()).run().unwrap();

    assert_eq!(summary.built().count(), 2);
    assert_eq!(summary.skipped, vec![env.source.join("NotAPackage")]);
    assert_file_exists(&env.central_build().join("Alpha-1.0.pkg"));
    assert_file_exists(&env.central_build().join("Beta-1.0.pkg"));
    assert_missing(&env.source.join("Alpha/build"));
    assert_missing(&env.source.join("Beta/build"));

    let alpha = env.source.join("Alpha");
    let calls = env.calls();
    assert_eq!(calls[0], format!("--sync {} --quiet", alpha.display()));
    assert_eq!(calls[1], format!("{} --quiet", alpha.display()));
    assert_eq!(calls.len(), 4);
}

#[test]
#[serial]
fn test_empty_target_builds_nothing() {
    let env = TestEnv::new();

    let summary = env.batch(env.config()).run().unwrap();

    assert!(summary.packages.is_empty());
    assert!(summary.skipped.is_empty());
    assert!(env.calls().is_empty());
    assert_missing(&env.central_build());
}

#[test]
#[serial]
fn test_verbose_run_does_not_pass_quiet() {
    let env = TestEnv::new();
    create_project(&env.source, "json");

    let config = Config {
        quiet: false,
        ..env.config()
    };
    env.batch(config).run().unwrap();

    assert_eq!(
        env.calls(),
        vec![
            format!("--sync {}", env.source.display()),
            env.source.display().to_string(),
        ]
    );
}

#[test]
#[serial]
fn test_build_failure_does_not_stop_batch() {
    let env = TestEnv::new();
    let broken = env.source.join("Broken");
    create_project(&broken, "plist");
    mark(&broken, "fail-build");
    create_project(&env.source.join("Working"), "plist");

    let summary = env.batch(env.config()).run().unwrap();

    let broken_report = &summary.packages[0];
    assert_eq!(broken_report.dir, broken);
    match &broken_report.status {
        PackageStatus::Failed(msg) => assert!(msg.contains("exit code 3"), "{}", msg),
        other => panic!("unexpected status: {:?}", other),
    }
    // Ownership is still reset after a failed build.
    assert!(broken_report.owner_reset);

    assert_eq!(summary.built().count(), 1);
    assert_file_exists(&env.central_build().join("Working-1.0.pkg"));
}

#[test]
#[serial]
fn test_sync_failure_skips_build() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");
    mark(&env.source, "fail-sync");

    let summary = env.batch(env.config()).run().unwrap();

    assert!(matches!(summary.packages[0].status, PackageStatus::Failed(_)));
    // Only the sync call was made.
    assert_eq!(env.calls().len(), 1);
    assert_missing(&env.central_build());
}

#[test]
#[serial]
fn test_missing_build_output_is_reported() {
    let env = TestEnv::new();
    create_project(&env.source, "yml");
    mark(&env.source, "no-output");

    let summary = env.batch(env.config()).run().unwrap();

    assert_eq!(summary.packages[0].status, PackageStatus::NoOutput);
    assert_missing(&env.central_build());
}

#[test]
#[serial]
fn test_leftover_files_keep_local_build_dir() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");
    mark(&env.source, "keep-log");

    env.batch(env.config()).run().unwrap();

    assert_file_exists(&env.source.join("build/build.log"));
    assert_missing(&env.source.join("build/source-1.0.pkg"));
    assert_file_exists(&env.central_build().join("source-1.0.pkg"));
}

#[test]
#[serial]
fn test_relocated_package_owned_like_project() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");

    env.batch(env.config()).run().unwrap();

    let project = fs::metadata(&env.source).unwrap();
    for path in [env.central_build(), env.central_build().join("source-1.0.pkg")] {
        let meta = fs::metadata(&path).unwrap();
        assert_eq!(meta.uid(), project.uid(), "{}", path.display());
        assert_eq!(meta.gid(), project.gid(), "{}", path.display());
    }
}

#[test]
#[serial]
fn test_owner_flag_skips_reset() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");

    let config = Config {
        keep_bom_owner: true,
        ..env.config()
    };
    let summary = env.batch(config).run().unwrap();

    assert!(!summary.packages[0].owner_reset);
    assert_eq!(summary.built().count(), 1);
}

#[test]
#[serial]
fn test_reset_applies_project_owner_to_descendants() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");

    let summary = env.batch(env.config()).run().unwrap();

    assert!(summary.packages[0].owner_reset);
    let project = fs::metadata(&env.source).unwrap();
    for rel in ["payload", "payload/usr/local/bin/tool", "Bom.txt", "build-info.plist"] {
        let meta = fs::metadata(env.source.join(rel)).unwrap();
        assert_eq!(meta.uid(), project.uid(), "{}", rel);
        assert_eq!(meta.gid(), project.gid(), "{}", rel);
    }
}

#[test]
#[serial]
fn test_build_location_is_the_project() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");

    let config = Config {
        build_location: env.source.clone(),
        ..env.config()
    };
    let summary = env.batch(config).run().unwrap();

    let artifact = env.source.join("build/source-1.0.pkg");
    assert_eq!(
        summary.packages[0].status,
        PackageStatus::Built(vec![artifact.clone()])
    );
    assert_file_exists(&artifact);
}

#[test]
#[serial]
fn test_build_location_is_a_scanned_project() {
    let env = TestEnv::new();
    create_project(&env.source.join("Alpha"), "plist");
    create_project(&env.source.join("Beta"), "plist");

    let config = Config {
        build_location: env.source.join("Beta"),
        ..env.config()
    };
    let summary = env.batch(config).run().unwrap();

    assert_eq!(summary.built().count(), 2);
    for name in ["Alpha-1.0.pkg", "Beta-1.0.pkg"] {
        assert_file_exists(&env.source.join("Beta/build").join(name));
    }
}

// Changing a descendant to a foreign owner needs root.
fn foreign_owned_descendant(env: &TestEnv) -> Option<std::path::PathBuf> {
    if !nix::unistd::geteuid().is_root() {
        eprintln!("skipping: requires root");
        return None;
    }
    let file = env.source.join("payload/usr/local/bin/tool");
    std::os::unix::fs::chown(&file, Some(4242), Some(4242)).unwrap();
    Some(file)
}

#[test]
#[serial]
fn test_owner_flag_leaves_descendant_owner() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");
    let Some(file) = foreign_owned_descendant(&env) else {
        return;
    };

    let config = Config {
        keep_bom_owner: true,
        ..env.config()
    };
    env.batch(config).run().unwrap();

    let meta = fs::metadata(&file).unwrap();
    assert_eq!((meta.uid(), meta.gid()), (4242, 4242));
}

#[test]
#[serial]
fn test_default_run_resets_descendant_owner() {
    let env = TestEnv::new();
    create_project(&env.source, "plist");
    let Some(file) = foreign_owned_descendant(&env) else {
        return;
    };

    env.batch(env.config()).run().unwrap();

    let project = fs::metadata(&env.source).unwrap();
    let meta = fs::metadata(&file).unwrap();
    assert_eq!((meta.uid(), meta.gid()), (project.uid(), project.gid()));
}
