//! Reload client injection into HTML documents.
//!
//! The injector looks for the first literal `<head>` tag and inserts a small
//! script right after it. Documents without `<head>` pass through untouched.

/// Text payload that makes connected browsers reload.
pub const RELOAD_SIGNAL: &str = "reload";

/// Tag the reload client is inserted after.
const HEAD_TAG: &[u8] = b"<head>";

/// Build the reload client script for the given port.
///
/// The script connects back to the host the page was loaded from and performs
/// a full reload when it receives [`RELOAD_SIGNAL`].
pub fn reload_client_script(port: u16) -> String {
    format!(
        "<script>\
(() => {{\
const ws = new WebSocket('ws://' + location.hostname + ':{port}');\
ws.onmessage = (event) => {{ if (event.data === '{RELOAD_SIGNAL}') {{ location.reload(); }} }};\
}})();\
</script>"
    )
}

/// Insert the reload client immediately after the first `<head>`.
///
/// Works on raw bytes so documents that are not valid UTF-8 are still served
/// byte-for-byte outside the inserted block.
pub fn inject_reload_client(document: Vec<u8>, port: u16) -> Vec<u8> {
    let Some(pos) = find(&document, HEAD_TAG) else {
        return document;
    };

    let script = reload_client_script(port);
    let split = pos + HEAD_TAG.len();

    let mut output = Vec::with_capacity(document.len() + script.len());
    output.extend_from_slice(&document[..split]);
    output.extend_from_slice(script.as_bytes());
    output.extend_from_slice(&document[split..]);
    output
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
