//! Address extraction from upstream list bodies.
//!
//! The upstream lists are treated as unstructured text: every line is matched
//! against a dotted-quad pattern and the first match on a line is kept. Lines
//! without a match are skipped silently, so headers, comments and the
//! non-address lines of the exit-addresses format never fail a pass.
//!
//! Octet ranges are not validated; `999.999.999.999` is extracted as-is.

use std::io;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::IP_PATTERN;


// Unicode off so `\d` only matches ASCII digits.
static IP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(IP_PATTERN)
        .unicode(false)
        .build()
        .expect("IP_PATTERN is a valid regular expression")
});

/// Returns the first address-shaped substring of `line`, if any.
pub fn first_ip(line: &str) -> Option<&str> {
    IP_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Lazily yields the first address of every matching line of `text`, in line order.
///
/// The iterator borrows `text`; calling the function again restarts from the
/// first line.
pub fn extract_ips(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter_map(first_ip)
}

/// Reads `reader` line by line and collects the first address of every matching line.
///
/// Lines are decoded lossily, so invalid UTF-8 in the body never aborts
/// extraction. Only I/O errors from the underlying stream are returned.
pub async fn extract_ips_from_reader<R>(mut reader: R) -> io::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut ips = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(ip) = first_ip(&line) {
            ips.push(ip.to_string());
        }
    }

    Ok(ips)
}
