// SPDX-License-Identifier: GPL-3.0-only
use std::io;
use std::path::Path;

const LATEST_LINK_NAME: &str = "latest";

/// Point `<type_dir>/latest` at the given version directory, replacing any
/// previous link. The target is stored relative to `type_dir` so the whole
/// output tree stays relocatable.
pub fn update_latest_symlink(type_dir: &Path, version_dir: &Path) -> io::Result<()> {
    let link_path = type_dir.join(LATEST_LINK_NAME);
    let target = version_dir.strip_prefix(type_dir).unwrap_or(version_dir);

    match std::fs::symlink_metadata(&link_path) {
        Ok(_) => std::fs::remove_file(&link_path)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    std::os::unix::fs::symlink(target, &link_path)
}
