//! Shell-script stand-ins for poppler-utils and tesseract.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use docvault_core::ExtractionSettings;

/// Write an executable `#!/bin/sh` script named `name` into `dir`.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}

/// Settings pointing every tool into `bin`, where missing scripts fail to spawn.
pub fn settings_in(bin: &Path) -> ExtractionSettings {
    let missing = |name: &str| bin.join(name).to_string_lossy().into_owned();
    ExtractionSettings {
        pdftotext_path: missing("pdftotext"),
        pdftoppm_path: missing("pdftoppm"),
        tesseract_path: missing("tesseract"),
        ..ExtractionSettings::default()
    }
}

/// Lines appended by the scripts to `log`, in call order.
pub fn calls(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

pub fn staged_input(dir: &Path, name: &str, content_type: &str, data: &[u8]) -> super::ExtractionInput {
    let path: PathBuf = dir.join(name);
    std::fs::write(&path, data).unwrap();
    super::ExtractionInput {
        path,
        content_type: content_type.to_string(),
        scratch_root: dir.to_path_buf(),
    }
}
