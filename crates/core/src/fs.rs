use rand::Rng;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// File extensions accepted as essay uploads.
pub const UPLOAD_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Read an uploaded essay file as text.
///
/// Only plain-text extensions are accepted. Invalid UTF-8 is replaced and
/// CRLF line endings are normalised to LF.
pub fn read_upload(path: &Path) -> io::Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) if UPLOAD_EXTENSIONS.contains(&ext.as_str()) => read_text(path),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported file type: {}", path.display()),
        )),
    }
}

/// Load the draft at `path`; a missing file is an empty essay.
pub fn read_draft(path: &Path) -> io::Result<String> {
    match read_text(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        other => other,
    }
}

fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    if text.contains("\r\n") {
        Ok(text.replace("\r\n", "\n"))
    } else {
        Ok(text)
    }
}

/// Replace `path` with `bytes` in one step.
///
/// The bytes go to a hidden sibling file which is synced and renamed over
/// `path`; the parent directory is synced afterwards. The sibling is removed
/// if any step before the rename fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => return Err(io::Error::other("missing parent")),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("missing file name"))?;
    let suffix: u64 = rand::thread_rng().r#gen();
    let staged = parent.join(format!(
        ".{}.essaydesk.tmp.{suffix}",
        file_name.to_string_lossy()
    ));

    let written = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&staged)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&staged, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&staged);
        return Err(err);
    }
    File::open(parent)?.sync_all()
}
