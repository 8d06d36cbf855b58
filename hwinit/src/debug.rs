//! Debug dump helpers on top of `log`.

use core::fmt;

/// Bytes per hexdump line.
pub const HEXDUMP_WIDTH: usize = 16;

/// One hexdump line: offset, hex bytes, printable ASCII.
struct HexLine<'a> {
    offset: usize,
    bytes: &'a [u8],
}

impl fmt::Display for HexLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x} ", self.offset)?;
        for i in 0..HEXDUMP_WIDTH {
            match self.bytes.get(i) {
                Some(b) => write!(f, " {:02x}", b)?,
                None => f.write_str("   ")?,
            }
        }
        f.write_str("  |")?;
        for &b in self.bytes {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' };
            write!(f, "{}", c)?;
        }
        f.write_str("|")
    }
}

/// Dump `bytes` at debug level under `target`.
///
/// Costs nothing unless debug logging is enabled for the target.
pub fn hexdump(target: &str, label: fmt::Arguments<'_>, bytes: &[u8]) {
    if !log::log_enabled!(target: target, log::Level::Debug) {
        return;
    }

    log::debug!(target: target, "{}", label);
    for (i, chunk) in bytes.chunks(HEXDUMP_WIDTH).enumerate() {
        log::debug!(
            target: target,
            "{}",
            HexLine { offset: i * HEXDUMP_WIDTH, bytes: chunk }
        );
    }
}
