//! Server-sent event framing for streamed chat completions.

/// Accumulates response bytes and yields the `data:` payload of each
/// complete event.
#[derive(Debug, Default)]
#[cfg_attr(not(feature = "github"), allow(dead_code))]
pub(crate) struct SseBuffer {
    buf: Vec<u8>,
}

#[cfg_attr(not(feature = "github"), allow(dead_code))]
impl SseBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete event with data. Events without `data:` lines
    /// (comments, keep-alives) are skipped.
    pub(crate) fn next_data(&mut self) -> Option<String> {
        loop {
            let (end, separator) = find_event_end(&self.buf)?;
            let event: Vec<u8> = self.buf.drain(..end + separator).collect();
            if let Some(data) = event_data(&event[..end]) {
                return Some(data);
            }
        }
    }

    /// Data of a trailing event the server closed without a blank line.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        event_data(&rest)
    }
}

fn event_data(event: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(event);
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

/// Position and length of the earliest blank-line separator.
fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    match (find(buf, b"\r\n\r\n"), find(buf, b"\n\n")) {
        (Some(crlf), Some(lf)) if crlf <= lf => Some((crlf, 4)),
        (_, Some(lf)) => Some((lf, 2)),
        (Some(crlf), None) => Some((crlf, 4)),
        (None, None) => None,
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut buffer = SseBuffer::default();
        buffer.push(b"data: {\"a\":1}\n\n");
        assert_eq!(buffer.next_data().as_deref(), Some("{\"a\":1}"));
        assert!(buffer.next_data().is_none());
    }

    #[test]
    fn test_event_split_across_pushes() {
        let mut buffer = SseBuffer::default();
        buffer.push(b"data: {\"choi");
        assert!(buffer.next_data().is_none());
        buffer.push(b"ces\":[]}\r\n\r\ndata: [DONE]\r\n\r\n");
        assert_eq!(buffer.next_data().as_deref(), Some("{\"choices\":[]}"));
        assert_eq!(buffer.next_data().as_deref(), Some("[DONE]"));
    }

    #[test]
    fn test_comments_skipped() {
        let mut buffer = SseBuffer::default();
        buffer.push(b": keep-alive\n\nevent: ping\n\ndata: x\n\n");
        assert_eq!(buffer.next_data().as_deref(), Some("x"));
    }

    #[test]
    fn test_multiline_data() {
        let mut buffer = SseBuffer::default();
        buffer.push(b"data: one\ndata: two\n\n");
        assert_eq!(buffer.next_data().as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn test_multibyte_char_split_across_pushes() {
        let bytes = "data: caf\u{e9}\n\n".as_bytes();
        let split = bytes.len() - 3;
        let mut buffer = SseBuffer::default();
        buffer.push(&bytes[..split]);
        assert!(buffer.next_data().is_none());
        buffer.push(&bytes[split..]);
        assert_eq!(buffer.next_data().as_deref(), Some("caf\u{e9}"));
    }

    #[test]
    fn test_finish_returns_unterminated_event() {
        let mut buffer = SseBuffer::default();
        buffer.push(b"data: tail");
        assert!(buffer.next_data().is_none());
        assert_eq!(buffer.finish().as_deref(), Some("tail"));
        assert!(buffer.finish().is_none());
    }
}
