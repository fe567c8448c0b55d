use super::CipherError;

/// Interprets `input` as a quoted string literal and returns its value.
///
/// Double-quoted literals accept the usual C escapes (`\n`, `\t`, `\\`, `\"`,
/// `\xHH`, octal `\NNN`, `\uXXXX`, `\UXXXXXXXX`). Back-quoted literals are raw:
/// no escapes, carriage returns dropped.
pub fn unquote(input: &str) -> Result<String, CipherError> {
    let bytes = input.as_bytes();
    if bytes.len() < 2 {
        return Err(format_error("literal is too short to be quoted"));
    }

    let quote = bytes[0];
    if bytes[bytes.len() - 1] != quote {
        return Err(format_error("literal has mismatched quotes"));
    }
    let body = &input[1..input.len() - 1];

    match quote {
        b'`' => {
            if body.contains('`') {
                return Err(format_error("raw literal contains a back-quote"));
            }
            Ok(body.replace('\r', ""))
        }
        b'"' => unescape(body),
        _ => Err(format_error("literal does not start with a quote")),
    }
}

fn unescape(body: &str) -> Result<String, CipherError> {
    if !body.contains('\\') {
        if body.contains('"') || body.contains('\n') {
            return Err(format_error("unescaped quote or newline in literal"));
        }
        return Ok(body.to_string());
    }

    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return Err(format_error("unescaped quote or newline in literal")),
            '\\' => {
                let escape = chars
                    .next()
                    .ok_or_else(|| format_error("literal ends inside an escape"))?;
                match escape {
                    'a' => out.push(0x07),
                    'b' => out.push(0x08),
                    'f' => out.push(0x0c),
                    'n' => out.push(b'\n'),
                    'r' => out.push(b'\r'),
                    't' => out.push(b'\t'),
                    'v' => out.push(0x0b),
                    '\\' => out.push(b'\\'),
                    '"' => out.push(b'"'),
                    'x' => out.push(read_radix(&mut chars, 2, 16)? as u8),
                    '0'..='7' => {
                        let rest = read_radix(&mut chars, 2, 8)?;
                        let value = (escape as u32 - '0' as u32) * 64 + rest;
                        if value > 0xff {
                            return Err(format_error("octal escape out of range"));
                        }
                        out.push(value as u8);
                    }
                    'u' => push_char(&mut out, read_radix(&mut chars, 4, 16)?)?,
                    'U' => push_char(&mut out, read_radix(&mut chars, 8, 16)?)?,
                    other => {
                        return Err(format_error(&format!("unknown escape sequence \\{other}")));
                    }
                }
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    String::from_utf8(out).map_err(|e| format_error(&format!("unquoted literal is not UTF-8: {e}")))
}

fn read_radix(chars: &mut std::str::Chars<'_>, digits: usize, radix: u32) -> Result<u32, CipherError> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| format_error("truncated numeric escape"))?;
        value = value * radix + digit;
    }
    Ok(value)
}

fn push_char(out: &mut Vec<u8>, code: u32) -> Result<(), CipherError> {
    let c = char::from_u32(code).ok_or_else(|| format_error("escape is not a valid code point"))?;
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    Ok(())
}

fn format_error(msg: &str) -> CipherError {
    CipherError::Format(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_literal() {
        assert_eq!(unquote("\"hello\"").unwrap(), "hello");
        assert_eq!(unquote("\"\"").unwrap(), "");
    }

    #[test]
    fn test_common_escapes() {
        assert_eq!(
            unquote(r##""#EXTM3U\nhttps://a/b?c=\"d\"\t\\""##).unwrap(),
            "#EXTM3U\nhttps://a/b?c=\"d\"\t\\"
        );
    }

    #[test]
    fn test_numeric_escapes() {
        assert_eq!(unquote(r#""\x41\102\u00e9\U0001F600""#).unwrap(), "AB\u{e9}\u{1F600}");
    }

    #[test]
    fn test_raw_literal() {
        assert_eq!(unquote("`a\\nb\r`").unwrap(), "a\\nb");
    }

    #[test]
    fn test_rejects_malformed_literals() {
        for bad in ["", "\"", "hello", "\"abc", "\"a\"b\"", "\"bad \\q\"", "\"\\x4\"", "\"trail\\\""] {
            assert!(
                matches!(unquote(bad), Err(CipherError::Format(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }
}
