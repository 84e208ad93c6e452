//! Shared test utilities for munkibatch tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use munkibatch::batch::Batch;
use munkibatch::config::Config;

/// Mock munkipkg.
///
/// Every invocation is appended to the call log. Marker files inside a
/// project change its behavior:
/// - `fail-sync`: `--sync` exits 2
/// - `fail-build`: build exits 3
/// - `no-output`: build succeeds without creating `build/`
/// - `keep-log`: build also writes `build/build.log`
const MOCK_MUNKIPKG: &str = r#"#!/bin/sh
echo "$*" >> "@LOG@"
if [ "$1" = "--sync" ]; then
    [ -f "$2/fail-sync" ] && exit 2
    exit 0
fi
dir="$1"
[ -f "$dir/fail-build" ] && exit 3
[ -f "$dir/no-output" ] && exit 0
mkdir -p "$dir/build"
echo pkg > "$dir/build/$(basename "$dir")-1.0.pkg"
[ -f "$dir/keep-log" ] && echo log > "$dir/build/build.log"
exit 0
"#;

/// Test environment: a source tree, a central build location, and a mock tool.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Directory handed to `--directory`
    pub source: PathBuf,
    /// Directory handed to `--buildLocation`
    pub output: PathBuf,
    /// Mock munkipkg script
    pub tool: PathBuf,
    /// Where the mock records its arguments
    pub call_log: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let source = base.join("source");
        let output = base.join("output");
        let call_log = base.join("calls.log");
        let tool = base.join("bin/munkipkg");

        fs::create_dir_all(&source).expect("Failed to create source dir");
        fs::create_dir_all(&output).expect("Failed to create output dir");
        create_mock_tool(&tool, &call_log);

        Self {
            _temp_dir: temp_dir,
            source,
            output,
            tool,
            call_log,
        }
    }

    /// Config pointing at this environment.
    pub fn config(&self) -> Config {
        Config {
            directory: self.source.clone(),
            build_location: self.output.clone(),
            tool: self.tool.to_string_lossy().into_owned(),
            quiet: true,
            keep_bom_owner: false,
        }
    }

    /// Batch using the mock tool.
    pub fn batch(&self, config: Config) -> Batch {
        Batch::new(config, self.tool.clone())
    }

    /// Central build directory.
    pub fn central_build(&self) -> PathBuf {
        self.output.join("build")
    }

    /// Lines the mock tool recorded, in call order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.call_log)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Write the mock munkipkg script to `path`.
pub fn create_mock_tool(path: &Path, call_log: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for tool");
    }

    let script = MOCK_MUNKIPKG.replace("@LOG@", &call_log.to_string_lossy());
    fs::write(path, script).expect("Failed to create mock tool");

    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Create a valid munkipkg project at `dir` with the given build-info extension.
pub fn create_project(dir: &Path, build_info_ext: &str) {
    fs::create_dir_all(dir.join("payload/usr/local/bin")).expect("Failed to create payload");
    fs::write(dir.join("payload/usr/local/bin/tool"), "#!/bin/sh\n").expect("Failed to write payload");
    fs::write(dir.join("Bom.txt"), "").expect("Failed to create Bom.txt");
    fs::write(dir.join(format!("build-info.{}", build_info_ext)), "")
        .expect("Failed to create build-info");
}

/// Drop a behavior marker for the mock tool into a project.
pub fn mark(dir: &Path, marker: &str) {
    fs::write(dir.join(marker), "").expect("Failed to create marker");
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(
        path.exists(),
        "Expected file to exist: {}",
        path.display()
    );
}

/// Assert that a path does not exist.
pub fn assert_missing(path: &Path) {
    assert!(
        !path.exists(),
        "Expected path to be absent: {}",
        path.display()
    );
}
