//! Payload locator for syslog-style datagrams.
//!
//! A local syslog client sends `<PRI>Mmm dd HH:MM:SS TAG: MSG`. The prefix is
//! not validated at all: the payload starts right after the first `": "` pair,
//! even when that pair is really part of the message text.

/// Delimiter separating the transport prefix from the payload.
pub const PAYLOAD_DELIMITER: &[u8; 2] = b": ";

/// Offset of the first payload byte, i.e. the index just past the first
/// `": "` pair, or `None` when the buffer has no delimiter.
///
/// For `<13>May 16 16:19:06 root: hello` this returns 26.
pub fn find_payload_start(buf: &[u8]) -> Option<usize> {
    buf.windows(PAYLOAD_DELIMITER.len())
        .position(|pair| pair == PAYLOAD_DELIMITER)
        .map(|colon| colon + PAYLOAD_DELIMITER.len())
}

/// The payload slice of `buf` (possibly empty), or `None` without a delimiter.
pub fn split_payload(buf: &[u8]) -> Option<&[u8]> {
    find_payload_start(buf).map(|start| &buf[start..])
}
