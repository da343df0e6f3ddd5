use crate::errors::{AppError, AppResult};
use encoding_rs::EUC_KR;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Streams a response body to disk in chunks.
///
/// The portal does not reliably send a content length, so the body is
/// consumed chunk by chunk until exhausted.
pub async fn persist_archive(mut response: reqwest::Response, path: &Path) -> AppResult<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        AppError::IoError(format!("Failed to create archive {}: {e}", path.display()))
    })?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(|e| {
            AppError::IoError(format!("Failed to write archive {}: {e}", path.display()))
        })?;
    }

    file.flush().await.map_err(|e| {
        AppError::IoError(format!("Failed to flush archive {}: {e}", path.display()))
    })?;

    Ok(())
}

/// Extracts a ZIP archive into `dest_dir`, returning the extracted file
/// paths in entry order.
///
/// The portal writes entry names in EUC-KR without the UTF-8 flag, so the
/// raw name bytes are reinterpreted to recover the Korean filenames. Names
/// that already are valid UTF-8 are used as stored; names that decode as
/// neither fall back to the archive's own (CP437-mapped) rendering with a
/// warning, and extraction of the entry still proceeds.
pub fn extract_archive(zip_path: &Path, dest_dir: &Path) -> AppResult<Vec<PathBuf>> {
    let file = File::open(zip_path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to open ZIP file {}: {e}",
            zip_path.display()
        ))
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| {
        AppError::ParseError(format!(
            "Failed to read ZIP archive {}: {e}",
            zip_path.display()
        ))
    })?;

    std::fs::create_dir_all(dest_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create directory {}: {e}",
            dest_dir.display()
        ))
    })?;

    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            AppError::ParseError(format!(
                "Failed to read entry {i} from ZIP {}: {e}",
                zip_path.display()
            ))
        })?;

        let name = decode_entry_name(entry.name_raw(), entry.name());

        // Directory entries materialize when their files are extracted
        if name.ends_with('/') {
            continue;
        }

        let relative = match sanitize_entry_path(&name) {
            Some(path) => path,
            None => {
                warn!(entry = %name, "Skipping unsafe archive entry name");
                continue;
            }
        };

        let out_path = dest_dir.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::IoError(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut out_file = File::create(&out_path).map_err(|e| {
            AppError::IoError(format!("Failed to create file {}: {e}", out_path.display()))
        })?;

        std::io::copy(&mut entry, &mut out_file).map_err(|e| {
            AppError::IoError(format!(
                "Failed to copy entry from ZIP {} to {}: {e}",
                zip_path.display(),
                out_path.display()
            ))
        })?;

        debug!(file = %out_path.display(), "Extracted archive entry");
        extracted.push(out_path);
    }

    Ok(extracted)
}

/// Recovers an entry name from its raw stored bytes.
///
/// Entries carrying valid UTF-8 need no reinterpretation. Everything else is
/// decoded as EUC-KR; bytes that are neither fall back to the name the
/// archive itself reports.
fn decode_entry_name(raw: &[u8], stored: &str) -> String {
    if let Ok(utf8) = std::str::from_utf8(raw) {
        return utf8.to_string();
    }
    match EUC_KR.decode_without_bom_handling_and_without_replacement(raw) {
        Some(decoded) => decoded.into_owned(),
        None => {
            warn!(
                entry = %stored,
                "Entry name is not valid EUC-KR, keeping stored name"
            );
            stored.to_string()
        }
    }
}

/// Rejects entry names that would escape the destination directory.
fn sanitize_entry_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}
