use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replaces `path` with `content` through a sibling temp file and a rename, so
/// readers see either the old or the new file. Missing parent directories are
/// created.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    stage_file(path, content)?.commit()
}

/// A fully written and synced temp file waiting to replace its target.
/// Dropping it without [`StagedFile::commit`] removes the temp file.
#[derive(Debug)]
pub struct StagedFile {
    tmp_path: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    pub fn commit(self) -> io::Result<()> {
        fs::rename(&self.tmp_path, &self.target)?;
        if let Some(parent) = self.target.parent()
            && let Ok(dir) = fs::File::open(parent)
        {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.tmp_path.exists() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Writes `content` next to `path` without touching `path` itself.
pub fn stage_file(path: &Path, content: &str) -> io::Result<StagedFile> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    fs::create_dir_all(parent)?;

    let file_name = path.file_name().and_then(|x| x.to_str()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid target filename: {}", path.display()),
        )
    })?;
    let tmp_name = format!(".{file_name}.sonarpipe.tmp.{}", uuid::Uuid::new_v4().simple());
    let staged = StagedFile {
        tmp_path: parent.join(tmp_name),
        target: path.to_path_buf(),
    };

    let mut tmp = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&staged.tmp_path)?;
    tmp.write_all(content.as_bytes())?;
    tmp.sync_all()?;
    Ok(staged)
}
