use std::path::Path;

/// Target collection for a fixture file: its base name up to the first `.`.
///
/// A name without a `.`, or whose only `.` is the leading character, is used
/// whole.
pub fn collection_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match base.find('.') {
        Some(i) if i > 0 => base[..i].to_string(),
        _ => base,
    }
}
