//! Text encoding detection for ledger and XML uploads.

use encoding_rs::{Encoding, UTF_8};

use crate::core::{AuditConfig, AuditError};

/// Resolve the configured fallback encoding label.
pub fn fallback_encoding(config: &AuditConfig) -> Result<&'static Encoding, AuditError> {
    Encoding::for_label(config.fallback_encoding.as_bytes()).ok_or_else(|| {
        AuditError::Encoding(format!(
            "unknown encoding label '{}'",
            config.fallback_encoding
        ))
    })
}

/// Best-effort detection: byte order mark, then strict UTF-8, else the fallback.
pub fn detect_encoding(bytes: &[u8], fallback: &'static Encoding) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        fallback
    }
}

/// Decode bytes with the detected encoding. Malformed sequences are replaced,
/// never fatal.
pub fn decode_text(bytes: &[u8], fallback: &'static Encoding) -> String {
    let encoding = detect_encoding(bytes, fallback);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = used.name(), "replaced malformed byte sequences");
    }
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1252};

    #[test]
    fn utf8_is_detected() {
        assert_eq!(detect_encoding("Competência".as_bytes(), WINDOWS_1252), UTF_8);
    }

    #[test]
    fn latin1_falls_back() {
        // "Competência" in ISO-8859-1
        let bytes = b"Compet\xeancia";
        assert_eq!(detect_encoding(bytes, WINDOWS_1252), WINDOWS_1252);
        assert_eq!(decode_text(bytes, WINDOWS_1252), "Competência");
    }

    #[test]
    fn bom_wins() {
        let bytes = [0xFF, 0xFE, b'|', 0x00];
        assert_eq!(detect_encoding(&bytes, WINDOWS_1252), UTF_16LE);
        assert_eq!(decode_text(&bytes, WINDOWS_1252), "|");
    }

    #[test]
    fn unknown_fallback_label() {
        let config = AuditConfig {
            fallback_encoding: "no-such-encoding".into(),
            ..Default::default()
        };
        assert!(matches!(
            fallback_encoding(&config),
            Err(AuditError::Encoding(_))
        ));
        assert_eq!(
            fallback_encoding(&AuditConfig::default()).unwrap(),
            WINDOWS_1252
        );
    }
}
