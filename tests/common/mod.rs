//! Common test utilities for integration tests

use kma_cli::progress::ProgressReporter;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Helper function to create a test ZIP file with UTF-8 named entries
#[allow(dead_code)]
pub fn create_test_zip(
    zip_path: &Path,
    files: &[(&str, &str)],
) -> Result<(), Box<dyn std::error::Error>> {
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, content) in files {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

/// Builds an in-memory ZIP whose entry names are arbitrary raw bytes.
///
/// The zip crate only writes UTF-8 names, but the portal's archives carry
/// EUC-KR name bytes without the UTF-8 flag. This writes the stored (no
/// compression) format by hand: local headers, central directory, end
/// record.
#[allow(dead_code)]
pub fn zip_bytes_with_raw_names(entries: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();
    let mut offsets = Vec::with_capacity(entries.len());

    for (name, data) in entries {
        offsets.push(out.len() as u32);
        let crc = crc32(data);
        // Local file header
        out.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
        out.extend_from_slice(&20u16.to_le_bytes()); // version needed
        out.extend_from_slice(&0u16.to_le_bytes()); // flags (no UTF-8 bit)
        out.extend_from_slice(&0u16.to_le_bytes()); // method: stored
        out.extend_from_slice(&0u16.to_le_bytes()); // mod time
        out.extend_from_slice(&0u16.to_le_bytes()); // mod date
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // extra len
        out.extend_from_slice(name);
        out.extend_from_slice(data);
    }

    let central_offset = out.len() as u32;
    for (i, (name, data)) in entries.iter().enumerate() {
        let crc = crc32(data);
        central.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]);
        central.extend_from_slice(&20u16.to_le_bytes()); // version made by
        central.extend_from_slice(&20u16.to_le_bytes()); // version needed
        central.extend_from_slice(&0u16.to_le_bytes()); // flags
        central.extend_from_slice(&0u16.to_le_bytes()); // method
        central.extend_from_slice(&0u16.to_le_bytes()); // mod time
        central.extend_from_slice(&0u16.to_le_bytes()); // mod date
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes()); // extra len
        central.extend_from_slice(&0u16.to_le_bytes()); // comment len
        central.extend_from_slice(&0u16.to_le_bytes()); // disk number
        central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
        central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
        central.extend_from_slice(&offsets[i].to_le_bytes());
        central.extend_from_slice(name);
    }
    let central_size = central.len() as u32;
    out.extend_from_slice(&central);

    // End of central directory
    out.extend_from_slice(&[0x50, 0x4B, 0x05, 0x06]);
    out.extend_from_slice(&0u16.to_le_bytes()); // disk
    out.extend_from_slice(&0u16.to_le_bytes()); // central dir disk
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&central_size.to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // comment len

    out
}

/// CRC-32 (ISO-HDLC) as the ZIP format requires, bitwise variant.
#[allow(dead_code)]
fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// Encodes a string as EUC-KR bytes, as the portal's archives store names.
#[allow(dead_code)]
pub fn euc_kr_bytes(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode(text);
    assert!(!had_errors, "test string must be representable in EUC-KR");
    bytes.into_owned()
}

/// Writes a region list CSV with the standard header.
#[allow(dead_code)]
pub fn write_region_csv(path: &Path, rows: &[(&str, &str, &str, &str)]) {
    let mut contents = String::from("Level1,Level2,Level3,ReqList_Last\n");
    for (l1, l2, l3, code) in rows {
        contents.push_str(&format!("{l1},{l2},{l3},{code}\n"));
    }
    fs::write(path, contents).unwrap();
}

/// Progress reporter that records every callback for assertions.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingReporter {
    pub progress: Mutex<Vec<(usize, usize, String)>>,
    pub files: Mutex<Vec<PathBuf>>,
}

impl ProgressReporter for RecordingReporter {
    fn on_progress(&self, completed: usize, total: usize, description: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((completed, total, description.to_string()));
    }

    fn on_file_written(&self, path: &Path) {
        self.files.lock().unwrap().push(path.to_path_buf());
    }
}
