//! Minimal HTTP/1.1 request intake.
//!
//! The server speaks exactly as much HTTP as the benchmark protocol needs:
//! one POST per connection, a handful of headers, an octet-stream body. The
//! request is read straight off the socket into one buffer; nothing here
//! survives the request child, so there is no connection reuse and no
//! keep-alive.

use std::io::{self, Read, Write};

use memchr::{memchr, memmem};
use thiserror::Error;

/// Hard ceiling on the request line plus headers. A client that sends this
/// much without a blank line is not speaking the protocol.
pub const MAX_HEADERS_SIZE: usize = 65536;

/// Why a request could not be read off the socket.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The peer closed the connection mid-request.
    #[error("connection closed before the request was complete")]
    UnexpectedEof,

    /// No end-of-headers sequence within [`MAX_HEADERS_SIZE`] bytes.
    #[error("request headers exceed the {MAX_HEADERS_SIZE}-byte limit")]
    HeadersTooLarge,

    /// The request line did not have its three parts.
    #[error("invalid HTTP request line {0:?}")]
    BadRequestLine(String),

    /// Anything but POST.
    #[error("unsupported HTTP method {0:?}")]
    BadMethod(String),

    /// The protocol field was not an HTTP version.
    #[error("invalid HTTP protocol {0:?}")]
    BadProtocol(String),

    /// Content-Length was present but not a decimal byte count.
    #[error("invalid Content-Length value {0:?}")]
    BadContentLength(String),

    /// Content-Type was present but not `application/octet-stream`.
    #[error("unsupported content type {0:?}")]
    BadContentType(String),

    /// The socket itself failed.
    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),
}

/// A fully received request: the raw target from the request line, and the
/// body bytes the Content-Length header promised.
pub struct Request {
    /// Target exactly as sent, e.g. `/run/hsw?kernel=sdot&n=64`.
    pub target: Vec<u8>,
    /// The submitted image.
    pub body: Vec<u8>,
}

/// Read one request off `connection`.
pub fn read_request(connection: &mut impl Read) -> Result<Request, HttpError> {
    let mut buffer = vec![0_u8; MAX_HEADERS_SIZE];
    let mut filled = 0;

    let headers_end = loop {
        if let Some(position) = memmem::find(&buffer[..filled], b"\r\n\r\n") {
            break position + 4;
        }
        if filled == buffer.len() {
            return Err(HttpError::HeadersTooLarge);
        }
        match connection.read(&mut buffer[filled..])? {
            0 => return Err(HttpError::UnexpectedEof),
            received => filled += received,
        }
    };

    let block = &buffer[..headers_end];
    let line_end = memmem::find(block, b"\r\n").unwrap_or(block.len());
    let target = parse_request_line(&block[..line_end])?.to_vec();

    let mut content_length = None;
    let mut rest = &block[line_end + 2..];
    while let Some(eol) = memmem::find(rest, b"\r\n") {
        let line = &rest[..eol];
        rest = &rest[eol + 2..];
        if line.is_empty() {
            break;
        }
        parse_header(line, &mut content_length)?;
    }

    // Whatever arrived past the headers is the start of the body.
    let content_length = content_length.unwrap_or(0) as usize;
    let available = &buffer[headers_end..filled];
    let head = available.len().min(content_length);
    let mut body = vec![0_u8; content_length];
    body[..head].copy_from_slice(&available[..head]);
    connection.read_exact(&mut body[head..]).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            HttpError::UnexpectedEof
        } else {
            HttpError::Io(err)
        }
    })?;

    Ok(Request { target, body })
}

/// Validate `POST <target> HTTP/x.y` and return the target.
fn parse_request_line(line: &[u8]) -> Result<&[u8], HttpError> {
    let mut pieces = line.splitn(3, |&byte| byte == b' ');
    let method = pieces.next().unwrap_or_default();
    let (Some(target), Some(protocol)) = (pieces.next(), pieces.next()) else {
        return Err(HttpError::BadRequestLine(lossy(line)));
    };

    if method != b"POST" {
        return Err(HttpError::BadMethod(lossy(method)));
    }
    if protocol.len() < 8 || !protocol.starts_with(b"HTTP/") {
        return Err(HttpError::BadProtocol(lossy(protocol)));
    }
    Ok(target)
}

/// Extract what the coordinator cares about from one header line. Headers
/// it has no use for fall through unexamined, as do lines that are not
/// headers at all.
fn parse_header(line: &[u8], content_length: &mut Option<u64>) -> Result<(), HttpError> {
    let Some(colon) = memchr(b':', line) else {
        return Ok(());
    };
    let name = &line[..colon];
    let value = line[colon + 1..].trim_ascii();

    if name.eq_ignore_ascii_case(b"Content-Length") {
        let parsed = std::str::from_utf8(value)
            .ok()
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| HttpError::BadContentLength(lossy(value)))?;
        *content_length = Some(parsed);
    } else if name.eq_ignore_ascii_case(b"Content-Type")
        && value != b"application/octet-stream"
    {
        return Err(HttpError::BadContentType(lossy(value)));
    }
    Ok(())
}

/// Write the success status line. The response body, one line per counter,
/// follows separately.
pub fn respond_ok(connection: &mut impl Write) -> io::Result<()> {
    connection.write_all(b"HTTP/1.1 200 OK\r\n\r\n")
}

/// Iterator over `name=value` pairs of a query string, leading `?`
/// included or not.
pub struct Query<'a> {
    rest: Option<&'a [u8]>,
}

/// One query parameter. `value` is `None` for a bare `name` with no `=`.
pub struct Parameter<'a> {
    /// Bytes before the `=`, possibly empty.
    pub name: &'a [u8],
    /// Bytes after the `=`, if there was one.
    pub value: Option<&'a [u8]>,
}

impl<'a> Query<'a> {
    /// Iterate the parameters of `query`.
    pub fn new(query: &'a [u8]) -> Query<'a> {
        let query = query.strip_prefix(b"?").unwrap_or(query);
        Query { rest: Some(query) }
    }
}

impl<'a> Iterator for Query<'a> {
    type Item = Parameter<'a>;

    fn next(&mut self) -> Option<Parameter<'a>> {
        let rest = self.rest.take()?;
        let segment = match memchr(b'&', rest) {
            Some(ampersand) => {
                self.rest = Some(&rest[ampersand + 1..]);
                &rest[..ampersand]
            }
            None => rest,
        };
        if segment.is_empty() && self.rest.is_none() {
            // The end of the query, not an empty parameter.
            return None;
        }
        Some(match memchr(b'=', segment) {
            Some(equals) => Parameter {
                name: &segment[..equals],
                value: Some(&segment[equals + 1..]),
            },
            None => Parameter {
                name: segment,
                value: None,
            },
        })
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A reader that hands out its data a few bytes at a time, the way a
    /// socket does.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
            let step = self.chunk.min(self.data.len()).min(buffer.len());
            buffer[..step].copy_from_slice(&self.data[..step]);
            self.data = &self.data[step..];
            Ok(step)
        }
    }

    #[test]
    fn reads_a_complete_request() {
        let wire = b"POST /run/any?kernel=sdot HTTP/1.1\r\nContent-Length: 4\r\nContent-Type: application/octet-stream\r\n\r\nELF!";
        let request = read_request(&mut Cursor::new(&wire[..])).unwrap();
        assert_eq!(request.target, b"/run/any?kernel=sdot");
        assert_eq!(request.body, b"ELF!");
    }

    #[test]
    fn reassembles_a_trickled_request() {
        let wire = b"POST /run/any?kernel=playground HTTP/1.1\r\nContent-Length: 10\r\n\r\n0123456789";
        let mut connection = Trickle {
            data: wire,
            chunk: 3,
        };
        let request = read_request(&mut connection).unwrap();
        assert_eq!(request.target, b"/run/any?kernel=playground");
        assert_eq!(request.body, b"0123456789");
    }

    #[test]
    fn oversized_headers_are_rejected() {
        let mut wire = Vec::from(&b"POST /run/any?kernel=sdot HTTP/1.1\r\n"[..]);
        while wire.len() <= MAX_HEADERS_SIZE {
            wire.extend_from_slice(b"X-Padding: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
        }
        // No terminating blank line anywhere in the first 64 KiB.
        assert!(matches!(
            read_request(&mut Cursor::new(wire)),
            Err(HttpError::HeadersTooLarge)
        ));
    }

    #[test]
    fn truncated_requests_are_eof() {
        let wire = b"POST /run/any?kernel=sdot HTTP/1.1\r\nContent-Le";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::UnexpectedEof)
        ));

        // Headers complete, body shorter than promised.
        let wire = b"POST /run/any?kernel=sdot HTTP/1.1\r\nContent-Length: 100\r\n\r\nshort";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::UnexpectedEof)
        ));
    }

    #[test]
    fn non_post_methods_are_rejected() {
        let wire = b"GET /run/any?kernel=sdot HTTP/1.1\r\n\r\n";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::BadMethod(method)) if method == "GET"
        ));
    }

    #[test]
    fn malformed_request_lines_are_rejected() {
        let wire = b"POST\r\n\r\n";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::BadRequestLine(_))
        ));

        let wire = b"POST /run/any?kernel=sdot FTP/1.1\r\n\r\n";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::BadProtocol(_))
        ));
    }

    #[test]
    fn wrong_content_type_is_rejected() {
        let wire = b"POST /run/any?kernel=sdot HTTP/1.1\r\nContent-Type: text/plain\r\n\r\n";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::BadContentType(value)) if value == "text/plain"
        ));
    }

    #[test]
    fn content_length_must_be_decimal() {
        let wire = b"POST /run/any?kernel=sdot HTTP/1.1\r\nContent-Length: lots\r\n\r\n";
        assert!(matches!(
            read_request(&mut Cursor::new(&wire[..])),
            Err(HttpError::BadContentLength(value)) if value == "lots"
        ));
    }

    #[test]
    fn header_values_are_trimmed_and_names_case_insensitive() {
        let wire =
            b"POST /run/any?kernel=sdot HTTP/1.1\r\ncontent-length:   2  \r\n\r\nok";
        let request = read_request(&mut Cursor::new(&wire[..])).unwrap();
        assert_eq!(request.body, b"ok");
    }

    #[test]
    fn query_iterates_pairs() {
        let mut query = Query::new(b"?kernel=sdot&n=1024&flag&=5&");
        let first = query.next().unwrap();
        assert_eq!(first.name, b"kernel");
        assert_eq!(first.value, Some(&b"sdot"[..]));

        let second = query.next().unwrap();
        assert_eq!(second.name, b"n");
        assert_eq!(second.value, Some(&b"1024"[..]));

        let bare = query.next().unwrap();
        assert_eq!(bare.name, b"flag");
        assert_eq!(bare.value, None);

        let anonymous = query.next().unwrap();
        assert_eq!(anonymous.name, b"");
        assert_eq!(anonymous.value, Some(&b"5"[..]));

        // A trailing '&' is not a parameter.
        assert!(query.next().is_none());
    }

    #[test]
    fn doubled_separator_yields_an_empty_parameter() {
        let mut query = Query::new(b"?a=1&&b=2");
        assert_eq!(query.next().unwrap().name, b"a");
        let empty = query.next().unwrap();
        assert_eq!(empty.name, b"");
        assert_eq!(empty.value, None);
        assert_eq!(query.next().unwrap().name, b"b");
        assert!(query.next().is_none());
    }

    #[test]
    fn empty_query_yields_nothing() {
        assert!(Query::new(b"").next().is_none());
        assert!(Query::new(b"?").next().is_none());
    }
}
