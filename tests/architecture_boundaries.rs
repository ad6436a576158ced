use std::fs;
use std::path::Path;

/// Every `.rs` file below `dir` (relative to the crate root) with its
/// contents, keyed by a forward-slash path such as `src/report/model.rs`.
fn sources(dir: &str) -> Vec<(String, String)> {
    fn walk(path: &Path, prefix: &str, found: &mut Vec<(String, String)>) {
        let Ok(entries) = fs::read_dir(path) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let label = format!("{prefix}/{name}");
            let path = entry.path();
            if path.is_dir() {
                walk(&path, &label, found);
            } else if name.ends_with(".rs") {
                found.push((label, fs::read_to_string(&path).unwrap_or_default()));
            }
        }
    }

    let mut found = Vec::new();
    walk(&Path::new(env!("CARGO_MANIFEST_DIR")).join(dir), dir, &mut found);
    assert!(!found.is_empty(), "no sources under {dir}");
    found.sort();
    found
}

fn offenders(
    files: &[(String, String)],
    needles: &[&str],
    exempt: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut found = Vec::new();
    for (label, content) in files {
        if exempt(label.as_str()) {
            continue;
        }
        for needle in needles {
            if content.contains(needle) {
                found.push(format!("{label} mentions `{needle}`"));
            }
        }
    }
    found
}

#[test]
fn report_module_does_not_touch_sysinfo_or_transport() {
    let violations = offenders(
        &sources("src/report"),
        &[
            "sysinfo",
            "crate::system::collector",
            "crate::system::platform::process_",
            "crate::server",
            "hyper",
            "tokio",
        ],
        |_| false,
    );
    assert!(violations.is_empty(), "{}", violations.join("\n"));
}

#[test]
fn report_module_never_reads_the_filesystem() {
    // Argument vectors reach the extractor through `ArgumentReader` only.
    let violations = offenders(
        &sources("src/report"),
        &["/proc", "std::fs", "fs::read", "File::open"],
        |_| false,
    );
    assert!(violations.is_empty(), "{}", violations.join("\n"));
}

#[test]
fn sysinfo_is_scoped_to_collector() {
    let violations = offenders(&sources("src"), &["sysinfo::"], |label| {
        label == "src/system/collector.rs"
    });
    assert!(violations.is_empty(), "{}", violations.join("\n"));
}

#[test]
fn target_os_cfg_is_scoped_to_system_platform() {
    let violations = offenders(&sources("src"), &["target_os"], |label| {
        label.starts_with("src/system/platform/")
    });
    assert!(violations.is_empty(), "{}", violations.join("\n"));
}

#[test]
fn proc_paths_are_scoped_to_linux_platform() {
    let violations = offenders(&sources("src"), &["\"/proc/", "format!(\"/proc"], |label| {
        label == "src/system/platform/linux.rs"
    });
    assert!(violations.is_empty(), "{}", violations.join("\n"));
}
