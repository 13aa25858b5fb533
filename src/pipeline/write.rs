//! Output writing.
//!
//! Every file is first staged as a temporary file in its destination
//! directory. Only once all of them are staged are they renamed over their
//! targets, so a failing write leaves the previous output in place and
//! readers (the preview server, a browser mid-reload) never observe a
//! half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::BuildError;

/// A fully computed output file.
#[derive(Debug, Clone)]
pub struct Output {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Write every output, returning the written paths in order.
pub fn commit(outputs: &[Output]) -> Result<Vec<PathBuf>, BuildError> {
    // Dropping the staged files on error removes them
    let staged = outputs
        .iter()
        .map(|output| Ok((stage(&output.path, &output.contents)?, &output.path)))
        .collect::<Result<Vec<_>, BuildError>>()?;

    staged
        .into_iter()
        .map(|(tmp, path)| {
            tmp.persist(path).map_err(|e| BuildError::io(path, e.error))?;
            Ok(path.clone())
        })
        .collect()
}

fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile, BuildError> {
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| BuildError::io(parent, e))?;
    tmp.write_all(contents).map_err(|e| BuildError::io(path, e))?;
    // Temp files are created 0600; outputs should be world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(|e| BuildError::io(path, e))?;
    }
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_creates_dirs_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dist/assets/css/app.css");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "old").unwrap();

        let outputs = [
            Output {
                path: target.clone(),
                contents: b"new".to_vec(),
            },
            Output {
                path: dir.path().join("dist/nested/deep/page.html"),
                contents: b"<p></p>".to_vec(),
            },
        ];
        let written = commit(&outputs).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(written[1].is_file());
    }

    #[test]
    fn test_no_temp_files_left() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.js");
        commit(&[Output {
            path: target,
            contents: b"x".to_vec(),
        }])
        .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_stage_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("dist/app.css");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::write(&first, "old").unwrap();
        // A file where a directory is needed
        fs::write(dir.path().join("dist/blocked"), "").unwrap();

        let err = commit(&[
            Output {
                path: first.clone(),
                contents: b"new".to_vec(),
            },
            Output {
                path: dir.path().join("dist/blocked/page.css"),
                contents: b"x".to_vec(),
            },
        ])
        .unwrap_err();

        assert!(matches!(err, BuildError::Io { .. }));
        assert_eq!(fs::read_to_string(&first).unwrap(), "old");
        let mut names: Vec<_> = fs::read_dir(dir.path().join("dist"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        names.sort();
        assert_eq!(names, ["app.css", "blocked"]);
    }
}
