//! Hex dump rendering for diagnostics
//!
//! Output layout, 16 bytes per line:
//!
//! ```text
//! 00000000  48 65 6C 6C 6F 5E 7C 77  6F 72 6C 64              Hello^|world
//! ```

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Render `data` as offset / hex / ASCII columns
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 64);

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08X}  ", line * BYTES_PER_LINE);

        for j in 0..BYTES_PER_LINE {
            if j == 8 {
                out.push(' ');
            }
            match chunk.get(j) {
                Some(b) => {
                    let _ = write!(out, "{:02X} ", b);
                }
                None => out.push_str("   "),
            }
        }

        out.push(' ');
        for &b in chunk {
            out.push(if (0x20..=0x7E).contains(&b) { b as char } else { '.' });
        }
        for _ in chunk.len()..BYTES_PER_LINE {
            out.push(' ');
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_short_line_is_padded() {
        let dump = hex_dump(b"Hi\n");
        let expected = format!(
            "00000000  48 69 0A {} {} Hi.{}\n",
            "   ".repeat(5),
            "   ".repeat(8),
            " ".repeat(13)
        );
        assert_eq!(dump, expected);
    }

    #[test]
    fn test_multiple_lines() {
        let data: Vec<u8> = (0u8..20).collect();
        let dump = hex_dump(&data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  00 01 02 03 04 05 06 07  08 09"));
        assert!(lines[1].starts_with("00000010  10 11 12 13"));
    }
}
