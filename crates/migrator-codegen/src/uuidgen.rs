//! §4.7: Talend's own id format, not an RFC 4122 UUID. Verbatim from
//! `original_source/translation_service.py`'s `generate_talend_id()`: 16
//! random bytes, standard base64, trailing `=` stripped, then
//! `+`→`p`, `/`→`s`, `-`→`m`, prefixed with `_`. Talend does not validate
//! UUID version/variant bits, so any 16 random bytes serve.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

pub fn generate_talend_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    encode_talend_id(&bytes)
}

fn encode_talend_id(bytes: &[u8; 16]) -> String {
    let encoded = STANDARD.encode(bytes);
    let stripped = encoded.trim_end_matches('=');
    let transliterated: String = stripped
        .chars()
        .map(|c| match c {
            '+' => 'p',
            '/' => 's',
            '-' => 'm',
            other => other,
        })
        .collect();
    format!("_{transliterated}")
}
