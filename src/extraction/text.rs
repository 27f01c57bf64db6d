use super::ExtractionError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|error| ExtractionError::InvalidEncoding(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_and_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Société Générale".as_bytes());
        assert_eq!(extract(&bytes).expect("utf8"), "Société Générale");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let error = extract(&[0x66, 0x6f, 0xff, 0x6f]).expect_err("latin-1 byte");
        assert!(matches!(error, ExtractionError::InvalidEncoding(_)));
    }
}
