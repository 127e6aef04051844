use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::converter::{DocumentConverter, PageRange};
use crate::error::Failure;

/// Writes a placeholder document, fails for the inputs listed in `failing`.
pub struct StubConverter {
    failing: Vec<PathBuf>,
    pub calls: Mutex<Vec<(PathBuf, PathBuf, PageRange)>>,
}

impl StubConverter {
    pub fn new(failing: Vec<PathBuf>) -> Self {
        Self { failing, calls: Mutex::new(Vec::new()) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl DocumentConverter for StubConverter {
    fn convert(&self, input_path: &Path, output_path: &Path, pages: PageRange) -> Result<(), Failure> {
        self.calls.lock().unwrap().push((input_path.to_path_buf(), output_path.to_path_buf(), pages));

        if self.failing.iter().any(|p| p == input_path) {
            return Err(Failure::ConversionFailed("corrupt document".to_string()));
        }

        fs::write(output_path, b"PK")?;
        Ok(())
    }
}

/// Fresh directory under the system temp folder.
pub fn scratch_dir(group: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(group).join(uuid::Uuid::new_v4().to_string());
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"%PDF-1.4").unwrap();
}

/// Creates `names` in a fresh scratch directory.
pub fn scratch_files(group: &str, names: &[&str]) -> (PathBuf, Vec<PathBuf>) {
    let dir = scratch_dir(group);

    let files = names.iter().map(|name| {
        let p = dir.join(name);
        touch(&p);
        p
    }).collect();

    (dir, files)
}
