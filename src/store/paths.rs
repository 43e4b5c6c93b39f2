use std::path::{Path, PathBuf};

/// `<root>/<prefix>`
pub fn record_dir(root: &Path, prefix: &str) -> PathBuf {
    root.join(prefix)
}

/// `<root>/<prefix>/<callsign>.json`
pub fn record_path(root: &Path, prefix: &str, callsign: &str) -> PathBuf {
    record_dir(root, prefix).join(format!("{callsign}.json"))
}
