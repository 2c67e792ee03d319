use fs_err as fs;
use std::path::Path;

use crate::errors::{CoachError, CoachResult};
use crate::wire::EquipmentPhoto;

/// Largest photo we are willing to inline into a request.
pub const MAX_PHOTO_BYTES: usize = 20 * 1024 * 1024;

pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Read an equipment photo fully into memory.
pub fn load_photo(path: &Path) -> CoachResult<EquipmentPhoto> {
    let mime_type = mime_for(path).ok_or_else(|| {
        CoachError::InvalidSelection(format!(
            "unsupported photo type: {} (use jpg, png, webp or gif)",
            path.display()
        ))
    })?;
    let bytes = fs::read(path).map_err(|e| CoachError::Config(e.to_string()))?;
    if bytes.is_empty() {
        return Err(CoachError::InvalidSelection(format!("photo {} is empty", path.display())));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(CoachError::InvalidSelection(format!(
            "photo {} is {} bytes, limit is {MAX_PHOTO_BYTES}",
            path.display(),
            bytes.len()
        )));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(EquipmentPhoto { file_name, mime_type: mime_type.to_string(), bytes })
}
