//! Filename and namespace sanitization

/// Reduce a client-supplied filename to a single safe path segment.
///
/// Anything up to the last `/` or `\` is dropped and control characters are
/// stripped. Returns `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();

    match cleaned.trim() {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Whether `segment` can be joined onto a directory as-is
pub fn is_safe_segment(segment: &str) -> bool {
    sanitize_filename(segment).as_deref() == Some(segment)
}
