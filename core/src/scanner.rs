use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use classgraph_zip::ZipArchive;

use crate::errors::ScanError;

const SUPPORTED_EXTENSIONS: &[&str] = &["class", "jar", "war", "ear"];
const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "war", "ear"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Walks a root path (file or directory) and invokes a callback for every
/// discovered `.class` file, unpacking `.jar`/`.war`/`.ear` archives as it
/// goes (spec. §4.2). Owns a scratch workspace for the duration of a single
/// scan; the workspace is deleted when the scanner is dropped.
pub struct Scanner<'cb> {
    workspace: TempDir,
    callback: Box<dyn FnMut(&Path) + 'cb>,
}

impl<'cb> Scanner<'cb> {
    pub fn new(callback: impl FnMut(&Path) + 'cb) -> Result<Scanner<'cb>, ScanError> {
        let workspace = TempDir::new().map_err(ScanError::WorkspaceCreation)?;
        Ok(Scanner {
            workspace,
            callback: Box::new(callback),
        })
    }

    /// Scans `root`, returning the number of `.class` files delivered to
    /// the callback.
    pub fn scan(&mut self, root: &Path) -> Result<usize, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }

        if root.is_file() {
            if is_supported(root) {
                return self.process_artifact(root);
            }
            return Ok(0);
        }

        if root.is_dir() {
            let mut count = 0;
            for entry in WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if is_supported(path) {
                    count += self.process_artifact(path)?;
                }
            }
            return Ok(count);
        }

        Err(ScanError::UnsupportedRoot(root.to_path_buf()))
    }

    fn process_artifact(&mut self, path: &Path) -> Result<usize, ScanError> {
        if has_extension(path, ARCHIVE_EXTENSIONS) {
            match self.unpack(path)? {
                Some(archive_dir) => self.scan(&archive_dir),
                None => Ok(0), // duplicate basename, already warned
            }
        } else {
            (self.callback)(path);
            Ok(1)
        }
    }

    // TODO: record the archive path alongside each extracted entry so callers
    // can trace a class file back to its parent archive (breadcrumb).
    fn unpack(&mut self, path: &Path) -> Result<Option<PathBuf>, ScanError> {
        let basename = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(path));
        let target_dir = self.workspace.path().join(&basename);

        if target_dir.is_dir() {
            log::warn!("duplicate archive basename, skipping: {}", basename.display());
            return Ok(None);
        }

        let bytes = std::fs::read(path)?;
        let archive = ZipArchive::new(bytes).map_err(|source| ScanError::CorruptArchive {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("extracting {} to {}", basename.display(), target_dir.display());
        std::fs::create_dir_all(&target_dir)?;
        archive
            .extract_all(&target_dir)
            .map_err(|source| ScanError::CorruptArchive {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Some(target_dir))
    }
}

fn is_supported(path: &Path) -> bool {
    has_extension(path, SUPPORTED_EXTENSIONS)
}

#[cfg(test)]
impl<'cb> Scanner<'cb> {
    /// Exposes the scratch workspace path so tests can assert it is gone
    /// after the scanner is dropped (spec §8 invariant 8).
    fn workspace_path(&self) -> PathBuf {
        self.workspace.path().to_path_buf()
    }
}
