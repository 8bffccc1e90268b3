//! Content type resolution.

use std::path::Path;

/// Content type used when the extension is missing or unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "text/html";

/// Return the MIME type string for the given file path.
///
/// Unknown or missing extensions resolve to [`FALLBACK_CONTENT_TYPE`] rather
/// than `application/octet-stream`, so extensionless pages still render.
pub fn content_type_for(path: &Path) -> &'static str {
    if path.extension().is_none() {
        return FALLBACK_CONTENT_TYPE;
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Whether the file is served through the HTML injector.
///
/// The match is case-sensitive: `page.HTML` is served verbatim.
pub(crate) fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}
