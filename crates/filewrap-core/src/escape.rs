//! Byte-to-literal escaping.
//!
//! Every byte value maps to a token that is valid inside a double-quoted
//! C/C++ string literal and decodes back to exactly that byte:
//!
//! | Class   | Bytes                                              | Token        |
//! |---------|----------------------------------------------------|--------------|
//! | `Raw`   | printable ASCII except `"` `'` `\` `?`             | the byte     |
//! | `Short` | `\n` `\r` `\t` `"` `'` `\` `?`                     | `\` + letter |
//! | `Octal` | everything else, NUL and DEL included              | `\` + 3 digits |
//!
//! Octal escapes always carry exactly three digits. A compiler stops
//! reading an octal escape after three digits, so a digit that follows in
//! the data can never be absorbed into the escape. Hex escapes have no
//! such limit. NUL is written as `\000` rather than `\0` for the same
//! reason.
//!
//! `?` is escaped so that sequences like `??=` are never read as trigraphs.

use std::fmt;
use std::io::{self, Write};

/// The escape prefix character
const ESCAPE: u8 = b'\\';

/// Which token shape a byte is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeClass {
    /// Emitted verbatim, 1 character
    Raw,
    /// Backslash plus one character, 2 characters
    Short,
    /// Backslash plus three octal digits, 4 characters
    Octal,
}

impl EscapeClass {
    /// Number of output characters a byte of this class expands to
    pub const fn width(self) -> usize {
        match self {
            EscapeClass::Raw => 1,
            EscapeClass::Short => 2,
            EscapeClass::Octal => 4,
        }
    }
}

/// Classifies a byte.
pub const fn classify(byte: u8) -> EscapeClass {
    match byte {
        b'\n' | b'\r' | b'\t' | b'"' | b'\'' | b'\\' | b'?' => EscapeClass::Short,
        0x20..=0x7E => EscapeClass::Raw,
        _ => EscapeClass::Octal,
    }
}

/// The escaped form of a single byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Escaped {
    buf: [u8; 4],
    len: u8,
}

impl Escaped {
    /// Returns the token bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// Returns the token as a string slice
    pub fn as_str(&self) -> &str {
        // Tokens consist of printable ASCII only.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Number of characters in the token (1, 2 or 4)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Escaped({:?})", self.as_str())
    }
}

/// Escapes a single byte.
pub const fn escape_byte(byte: u8) -> Escaped {
    match classify(byte) {
        EscapeClass::Raw => Escaped {
            buf: [byte, 0, 0, 0],
            len: 1,
        },
        EscapeClass::Short => {
            let marker = match byte {
                b'\n' => b'n',
                b'\r' => b'r',
                b'\t' => b't',
                other => other,
            };
            Escaped {
                buf: [ESCAPE, marker, 0, 0],
                len: 2,
            }
        }
        EscapeClass::Octal => Escaped {
            buf: [
                ESCAPE,
                b'0' + byte / 64,
                b'0' + (byte % 64) / 8,
                b'0' + byte % 8,
            ],
            len: 4,
        },
    }
}

/// Writes the escaped form of `bytes` to `out`.
///
/// Tokens are staged in a small local buffer so a chunk costs a handful of
/// `write_all` calls rather than one per byte.
pub fn write_escaped<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    const STAGE: usize = 1024;
    let mut staged = [0u8; STAGE];
    let mut used = 0;

    for &byte in bytes {
        let token = escape_byte(byte);
        if used + token.len() > STAGE {
            out.write_all(&staged[..used])?;
            used = 0;
        }
        staged[used..used + token.len()].copy_from_slice(token.as_bytes());
        used += token.len();
    }

    if used > 0 {
        out.write_all(&staged[..used])?;
    }
    Ok(())
}

/// Escapes `bytes` into an owned string.
pub fn escape_to_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        out.push_str(escape_byte(byte).as_str());
    }
    out
}

/// Length in characters of the escaped form of `bytes`.
pub fn escaped_len(bytes: &[u8]) -> usize {
    bytes.iter().map(|&b| classify(b).width()).sum()
}
