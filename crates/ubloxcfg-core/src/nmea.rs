//! NMEA 0183 Sentences
//!
//! Validation, naming and info extraction for the text protocol the receiver
//! emits alongside UBX.
//!
//! Sentence format: `$<address>,<field>,...*HH\r\n` where `HH` is the XOR of all
//! characters between `$` and `*`. The checksum field is optional.

/// Start character
pub const NMEA_START: u8 = b'$';
/// Maximum sentence size accepted by the parser (u-blox sentences exceed the
/// standard 82 characters)
pub const NMEA_MAX_SIZE: usize = 400;

/// Result of checking the start of a buffer for a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceCheck {
    /// A valid sentence of the given size (including `\r\n`)
    Complete(usize),
    /// Could be a sentence, more bytes are needed
    NeedMore,
    /// Not a (valid) sentence
    Invalid,
}

/// XOR checksum of the sentence body
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0, |ck, &b| ck ^ b)
}

/// Build a complete sentence from its body (without `$`, `*HH` and `\r\n`)
pub fn make_sentence(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, checksum(body.as_bytes()))
}

/// Check whether `buf` starts with a complete, valid sentence
pub fn check_sentence(buf: &[u8]) -> SentenceCheck {
    if buf.first() != Some(&NMEA_START) {
        return SentenceCheck::Invalid;
    }
    for (ix, &b) in buf.iter().enumerate().skip(1) {
        if ix + 1 >= NMEA_MAX_SIZE {
            return SentenceCheck::Invalid;
        }
        match b {
            b'\r' => {
                return match buf.get(ix + 1) {
                    None => SentenceCheck::NeedMore,
                    Some(b'\n') if is_valid(&buf[1..ix]) => SentenceCheck::Complete(ix + 2),
                    Some(_) => SentenceCheck::Invalid,
                };
            }
            b'$' => return SentenceCheck::Invalid,
            0x20..=0x7e => {}
            _ => return SentenceCheck::Invalid,
        }
    }
    SentenceCheck::NeedMore
}

/// Validate the body between `$` and `\r\n`: address and optional checksum
fn is_valid(body: &[u8]) -> bool {
    let data = match body.iter().position(|&b| b == b'*') {
        Some(star) => {
            let (data, ck) = (&body[..star], &body[star + 1..]);
            let expected = std::str::from_utf8(ck)
                .ok()
                .filter(|s| s.len() == 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok());
            if expected != Some(checksum(data)) {
                return false;
            }
            data
        }
        None => body,
    };
    let address = data.split(|&b| b == b',').next().unwrap_or_default();
    address.len() >= 3 && address.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Split a sentence into address and data fields (without checksum)
fn split(sentence: &[u8]) -> Option<(&str, &str)> {
    let text = std::str::from_utf8(sentence).ok()?;
    let body = text.strip_prefix('$')?.trim_end_matches(['\r', '\n']);
    let body = body.split('*').next().unwrap_or(body);
    Some(match body.split_once(',') {
        Some((address, fields)) => (address, fields),
        None => (body, ""),
    })
}

/// Talker and formatter of a sentence, e.g. ("GN", "GGA") or ("PUBX", "00")
pub fn address(sentence: &[u8]) -> Option<(String, String)> {
    let (address, fields) = split(sentence)?;
    if address.len() < 3 {
        return None;
    }
    if address.starts_with('P') && address.len() >= 4 {
        let formatter = if address.len() > 4 {
            &address[4..]
        } else {
            fields.split(',').next().unwrap_or_default()
        };
        return Some((address[..4].to_string(), formatter.to_string()));
    }
    Some((address[..2].to_string(), address[2..].to_string()))
}

/// Canonical sentence name, e.g. "NMEA-GN-TXT"
pub fn sentence_name(sentence: &[u8]) -> String {
    match address(sentence) {
        Some((talker, formatter)) => format!("NMEA-{}-{}", talker, formatter),
        None => "NMEA-?".to_string(),
    }
}

/// Info for sentences worth summarising (text messages: their data fields)
pub fn sentence_info(sentence: &[u8]) -> Option<String> {
    let (address, fields) = split(sentence)?;
    if address.len() == 5 && address.ends_with("TXT") {
        Some(fields.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_sentence() {
        assert_eq!(
            make_sentence("GNTXT,01,01,02,u-blox AG - www.u-blox.com"),
            "$GNTXT,01,01,02,u-blox AG - www.u-blox.com*4E\r\n"
        );
    }

    #[test]
    fn test_check_complete() {
        let s = b"$GNTXT,01,01,02,u-blox AG - www.u-blox.com*4E\r\n";
        assert_eq!(check_sentence(s), SentenceCheck::Complete(s.len()));

        let mut longer = s.to_vec();
        longer.extend_from_slice(b"$GNGGA");
        assert_eq!(check_sentence(&longer), SentenceCheck::Complete(s.len()));
    }

    #[test]
    fn test_check_partial() {
        assert_eq!(check_sentence(b"$GNGGA,1234"), SentenceCheck::NeedMore);
        assert_eq!(check_sentence(b"$GNGGA,1234*00\r"), SentenceCheck::NeedMore);
    }

    #[test]
    fn test_check_invalid() {
        assert_eq!(check_sentence(b"$GNTXT,01*00\r\n"), SentenceCheck::Invalid);
        assert_eq!(check_sentence(b"$GN\x01TXT"), SentenceCheck::Invalid);
        assert_eq!(check_sentence(b"$GNGG$GNTXT"), SentenceCheck::Invalid);
        assert_eq!(check_sentence(b"$,1\r\n"), SentenceCheck::Invalid);
        assert_eq!(check_sentence(b"GNGGA"), SentenceCheck::Invalid);

        let mut long = b"$GNGGA,".to_vec();
        long.resize(NMEA_MAX_SIZE + 10, b'1');
        assert_eq!(check_sentence(&long), SentenceCheck::Invalid);
    }

    #[test]
    fn test_no_checksum_field() {
        assert_eq!(check_sentence(b"$PUBX,00\r\n"), SentenceCheck::Complete(10));
    }

    #[test]
    fn test_names() {
        assert_eq!(sentence_name(make_sentence("GNGGA,,,").as_bytes()), "NMEA-GN-GGA");
        assert_eq!(sentence_name(make_sentence("PUBX,04,1").as_bytes()), "NMEA-PUBX-04");
        assert_eq!(sentence_name(make_sentence("PGRMT,x").as_bytes()), "NMEA-PGRM-T");
    }

    #[test]
    fn test_txt_info() {
        let s = make_sentence("GNTXT,01,01,04,hello");
        assert_eq!(sentence_info(s.as_bytes()).as_deref(), Some("01,01,04,hello"));
        assert_eq!(sentence_info(make_sentence("GNGGA,1").as_bytes()), None);
    }
}
