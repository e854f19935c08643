//! Decoding of DataStage's control-marker encoding for string property
//! values (§4.4). Used both by the ASG builder (§4.3 step 4) when it first
//! extracts stage properties, and by the IR lowerer when it normalizes
//! path-shaped values a second time — the function is idempotent
//! (§8 invariant 4), so calling it twice is harmless.

use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\(\d+\)").unwrap());

/// Decode a raw DSX string value: strip `\(<n>)` control markers, unescape
/// `\\` to `\`, strip a leading `0file/`/`0file\` prefix, trim a trailing
/// sentinel `0` after a path, and normalize path separators to `/`.
///
/// Grounded verbatim against `original_source/translation_service.py`'s
/// `file_path.replace('0file/', '').replace('0file\\', '')`.
pub fn decode_dsx_value(raw: &str) -> String {
    let no_markers = CONTROL_MARKER.replace_all(raw, "");
    let unescaped = no_markers.replace("\\\\", "\\");

    let mut value = unescaped.as_str();
    if let Some(stripped) = value.strip_prefix("0file/") {
        value = stripped;
    } else if let Some(stripped) = value.strip_prefix("0file\\") {
        value = stripped;
    }

    let mut value = value.replace('\\', "/");
    if value.ends_with('0') && looks_like_path(&value) {
        value.pop();
    }
    value
}

fn looks_like_path(value: &str) -> bool {
    value.len() > 1 && (value.contains('/') || value.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_0file_prefix_and_normalizes_slashes() {
        assert_eq!(decode_dsx_value("0file/D:\\in.csv"), "D:/in.csv");
        assert_eq!(decode_dsx_value("0file\\D:\\in.csv"), "D:/in.csv");
    }

    #[test]
    fn strips_control_markers() {
        assert_eq!(decode_dsx_value(r"foo\(1)bar"), "foobar");
    }

    #[test]
    fn is_idempotent() {
        for input in ["0file/D:\\in.csv", "plain value", r"foo\(2)bar0", ""] {
            let once = decode_dsx_value(input);
            let twice = decode_dsx_value(&once);
            assert_eq!(once, twice);
        }
    }
}
