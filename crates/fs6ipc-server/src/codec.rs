use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// One framed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Text(String),
    /// A line longer than the limit; its bytes were discarded.
    TooLong,
}

/// Newline framing for request lines.
///
/// Wraps [`LinesCodec`] so that an over-long line is reported as
/// [`Line::TooLong`] instead of an error. The stream keeps going and the next
/// line is decoded normally. `\r\n` terminators are accepted.
#[derive(Debug, Clone)]
pub struct RequestLineCodec {
    inner: LinesCodec,
}

impl RequestLineCodec {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_line_length),
        }
    }

    pub fn max_line_length(&self) -> usize {
        self.inner.max_length()
    }
}

fn lift(result: Result<Option<String>, LinesCodecError>) -> Result<Option<Line>, std::io::Error> {
    match result {
        Ok(line) => Ok(line.map(Line::Text)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Line::TooLong)),
        Err(LinesCodecError::Io(err)) => Err(err),
    }
}

impl Decoder for RequestLineCodec {
    type Item = Line;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Line>, Self::Error> {
        lift(self.inner.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Line>, Self::Error> {
        lift(self.inner.decode_eof(src))
    }
}

impl Encoder<String> for RequestLineCodec {
    type Error = std::io::Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(line, dst).map_err(|err| match err {
            LinesCodecError::Io(err) => err,
            LinesCodecError::MaxLineLengthExceeded => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "line too long")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lf_and_crlf_lines() {
        let mut codec = RequestLineCodec::new(64);
        let mut buf = BytesMut::from(&b"{\"a\":1}\r\n{\"b\":2}\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Line::Text("{\"a\":1}".to_string()))
        );
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Line::Text("{\"b\":2}".to_string()))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn over_long_line_is_reported_then_skipped() {
        let mut codec = RequestLineCodec::new(8);
        let mut buf = BytesMut::from(&b"0123456789abcdef\nok\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Line::TooLong));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Line::Text("ok".to_string())));
    }

    #[test]
    fn partial_line_waits_for_more() {
        let mut codec = RequestLineCodec::new(64);
        let mut buf = BytesMut::from(&b"{\"cmd\""[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b":\"ipc\"}\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Line::Text("{\"cmd\":\"ipc\"}".to_string()))
        );
    }

    #[test]
    fn encode_appends_newline() {
        let mut codec = RequestLineCodec::new(64);
        let mut buf = BytesMut::new();
        codec.encode("{\"ok\":true}".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"{\"ok\":true}\n");
    }
}
