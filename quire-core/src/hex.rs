//! Hex dump for binary files opened in the editor

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Format `bytes` as a fixed-width hex/ASCII dump.
///
/// Each line covers 16 bytes: a four digit offset, the bytes in groups of
/// four (with a wider gap in the middle), then the printable ASCII column.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 5);

    for (line_idx, chunk) in bytes.chunks(16).enumerate() {
        let offset = line_idx * 16;
        for shift in [12, 8, 4, 0] {
            out.push(HEX_DIGITS[(offset >> shift) & 0xf] as char);
        }
        out.push(' ');

        for j in 0..16 {
            if j % 4 == 0 {
                out.push(' ');
            }
            if j == 8 {
                out.push(' ');
            }
            match chunk.get(j) {
                Some(&b) => {
                    out.push(HEX_DIGITS[(b >> 4) as usize] as char);
                    out.push(HEX_DIGITS[(b & 0xf) as usize] as char);
                }
                None => out.push_str("  "),
            }
            out.push(' ');
        }

        out.push(' ');

        for (j, &b) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            out.push(printable(b));
        }

        out.push('\n');
    }

    out
}

fn printable(b: u8) -> char {
    if (0x20..0x7f).contains(&b) {
        b as char
    } else {
        ' '
    }
}
