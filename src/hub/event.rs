//! SSE event framing
//!
//! Events are delivered to subscribers as text event-stream frames. The
//! format is fixed for interop: `id: <event-id>`, one `data:` line per
//! payload line, and a trailing blank line. Frames are built once per
//! publish and handed out as `Bytes`, so fan-out to any number of
//! subscribers shares a single allocation.

use bytes::Bytes;

/// Format a single event frame
///
/// The payload is split on `\n` or `\r\n`; a multi-line payload becomes
/// multiple `data:` lines preserving structure.
pub fn format_event(event_id: &str, payload: &str) -> Bytes {
    let mut frame = String::with_capacity(payload.len() + event_id.len() + 16);

    frame.push_str("id: ");
    frame.push_str(event_id);
    frame.push('\n');

    for line in payload.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }

    frame.push('\n');
    Bytes::from(frame)
}

/// Format the acknowledgement comment frame
///
/// Sent as the first frame on a new stream, carrying the resolved
/// connection id.
pub fn ack_frame(connection_id: &str) -> Bytes {
    Bytes::from(format!(": connected {}\n\n", connection_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_event() {
        let frame = format_event("evt-1", "hello");
        assert_eq!(&frame[..], b"id: evt-1\ndata: hello\n\n");
    }

    #[test]
    fn test_multi_line_event_preserves_structure() {
        let frame = format_event("evt-2", "first\nsecond\nthird");
        assert_eq!(
            &frame[..],
            b"id: evt-2\ndata: first\ndata: second\ndata: third\n\n"
        );
    }

    #[test]
    fn test_crlf_payload() {
        let frame = format_event("evt-3", "first\r\nsecond");
        assert_eq!(&frame[..], b"id: evt-3\ndata: first\ndata: second\n\n");
    }

    #[test]
    fn test_empty_payload() {
        let frame = format_event("evt-4", "");
        assert_eq!(&frame[..], b"id: evt-4\ndata: \n\n");
    }

    #[test]
    fn test_ack_frame() {
        let frame = ack_frame("conn-9");
        assert_eq!(&frame[..], b": connected conn-9\n\n");
    }
}
