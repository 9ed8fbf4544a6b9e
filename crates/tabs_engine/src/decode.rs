use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::{FailureKind, FetchError, FetchOutput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}")]
    Malformed { encoding: String },
}

/// Decode a response body to UTF-8.
///
/// Order: byte order mark, then the `charset` of the Content-Type header, then
/// a chardetng guess.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

/// [`decode_html`] over a fetched body, folded into the fetch error space.
pub fn decode_body(output: &FetchOutput) -> Result<String, FetchError> {
    decode_html(&output.bytes, output.metadata.content_type.as_deref())
        .map(|decoded| decoded.html)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\''))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_parameter_is_case_insensitive_and_unquoted() {
        assert_eq!(charset_label("text/html; Charset=\"Shift_JIS\""), Some("Shift_JIS"));
        assert_eq!(charset_label("text/html"), None);
    }

    #[test]
    fn header_charset_is_honoured() {
        let decoded = decode_html(&[0x63, 0x61, 0x66, 0xe9], Some("text/html; charset=windows-1252"))
            .unwrap();
        assert_eq!(decoded.html, "café");
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn bom_wins_over_header() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice("ok".as_bytes());
        let decoded = decode_html(&bytes, Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(decoded.html, "ok");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }
}
