use unicode_normalization::UnicodeNormalization;

/// Normalize user input before it is embedded in a prompt: NFC composition
/// (keeps umlauts and ß in their canonical form), newlines collapsed,
/// surrounding whitespace dropped.
pub fn normalize_input(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.replace(['\n', '\r'], " ").trim().to_string()
}
