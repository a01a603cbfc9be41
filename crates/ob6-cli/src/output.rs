//! Writing built messages as hex text or `.syx` files.

use std::fs;
use std::path::{Path, PathBuf};

use ob6_sysex::MidiMessage;

use crate::config::{OutputFormat, OutputSettings};
use crate::error::{Error, Result};

/// Upper-case hex with a space between bytes, e.g. `F0 01 2E 0E F7`.
pub fn hex_line(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emit `messages` the way `settings` asks. Returns the files written.
pub fn emit(
    messages: &[MidiMessage],
    settings: &OutputSettings,
    out: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    match settings.format {
        OutputFormat::Hex => {
            for message in messages {
                println!("{}", hex_line(&message.to_bytes()));
            }
            Ok(Vec::new())
        }
        OutputFormat::Syx => {
            let out = out.ok_or_else(|| {
                Error::Config("syx output needs a file, pass --out".to_string())
            })?;
            if settings.file_per_message && messages.len() > 1 {
                write_each(messages, out)
            } else {
                let bytes: Vec<u8> = messages.iter().flat_map(|m| m.to_bytes()).collect();
                fs::write(out, bytes)?;
                log::info!("Wrote {} messages to {}", messages.len(), out.display());
                Ok(vec![out.to_path_buf()])
            }
        }
    }
}

/// `patch.syx` becomes `patch-001.syx`, `patch-002.syx`, ...
fn numbered_path(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "message".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{}-{:03}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}-{:03}", stem, index),
    };
    base.with_file_name(name)
}

fn write_each(messages: &[MidiMessage], base: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(messages.len());
    for (i, message) in messages.iter().enumerate() {
        let path = numbered_path(base, i + 1);
        fs::write(&path, message.to_bytes())?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    log::info!("Wrote {} files", written.len());
    Ok(written)
}
