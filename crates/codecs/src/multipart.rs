//! `multipart/form-data` bodies (RFC 7578).
//!
//! Used for uploads: a structured payload part alongside one or more file
//! parts. Each part is framed by a `--boundary` line and carries its own
//! `Content-Disposition` and optional `Content-Type` headers. Lines end in CRLF
//! and the body ends with a closing `--boundary--` delimiter.

use std::borrow::Cow;
use std::sync::Arc;

use exchange::{
    unset_or_is, CodecError, ContentType, Decoded, MultipartForm, Outbound, Part, PartBody,
    Payload, ReaderStrategy, TypeDescriptor, WriterStrategy,
};
use tracing::debug;
use uuid::Uuid;

use crate::JsonMapper;

const CRLF: &[u8] = b"\r\n";

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Writes [`MultipartForm`] values as `multipart/form-data`.
///
/// Must be registered ahead of the JSON writer so forms are never offered to
/// a generic structured codec first.
#[derive(Debug, Clone)]
pub struct MultipartWriter {
    mapper: Arc<dyn JsonMapper>,
}

impl MultipartWriter {
    /// Creates a writer that encodes JSON parts through `mapper`.
    pub fn new(mapper: Arc<dyn JsonMapper>) -> Self {
        Self { mapper }
    }

    fn part_body<'p>(&self, part: &'p Part) -> Result<Cow<'p, [u8]>, CodecError> {
        Ok(match part.body() {
            PartBody::Json(value) => Cow::Owned(self.mapper.to_bytes(value, part.name())?),
            PartBody::Text(text) => Cow::Borrowed(text.as_bytes()),
            PartBody::Binary(bytes) => Cow::Borrowed(bytes.as_slice()),
        })
    }
}

impl WriterStrategy for MultipartWriter {
    fn name(&self) -> &'static str {
        "multipart"
    }

    fn can_write(&self, ty: &TypeDescriptor, declared: Option<&ContentType>) -> bool {
        ty.is_multipart() && unset_or_is(declared, ContentType::MULTIPART_FORM_DATA)
    }

    fn write(&self, value: &Outbound<'_>) -> Result<Payload, CodecError> {
        let form = value.as_form().ok_or_else(|| CodecError::UnsupportedValue {
            strategy: self.name(),
            type_name: value.descriptor().name().to_string(),
        })?;
        if form.is_empty() {
            return Err(CodecError::multipart("form has no parts"));
        }

        let bodies = form
            .parts()
            .iter()
            .map(|part| self.part_body(part))
            .collect::<Result<Vec<_>, _>>()?;
        let boundary = unique_boundary(&bodies);

        let mut out = Vec::with_capacity(bodies.iter().map(|b| b.len() + 128).sum());
        for (part, body) in form.parts().iter().zip(&bodies) {
            write_part_head(&mut out, &boundary, part)?;
            out.extend_from_slice(body);
            out.extend_from_slice(CRLF);
        }
        out.extend_from_slice(format!("--{boundary}--").as_bytes());
        out.extend_from_slice(CRLF);

        debug!(
            parts = form.parts().len(),
            binary = form.has_binary(),
            bytes = out.len(),
            "Encoded multipart form"
        );
        Ok(Payload::new(out, Some(ContentType::multipart_form_data(&boundary))))
    }
}

fn unique_boundary(bodies: &[Cow<'_, [u8]>]) -> String {
    loop {
        let boundary = format!("exchange-{}", Uuid::new_v4().simple());
        if !bodies
            .iter()
            .any(|body| find(body, boundary.as_bytes(), 0).is_some())
        {
            return boundary;
        }
    }
}

fn write_part_head(out: &mut Vec<u8>, boundary: &str, part: &Part) -> Result<(), CodecError> {
    let mut head = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"",
        header_safe("name", part.name())?
    );
    if let Some(filename) = part.filename() {
        let filename = filename.replace('"', "%22");
        head.push_str(&format!("; filename=\"{}\"", header_safe("filename", &filename)?));
    }
    head.push_str("\r\n");
    if let Some(content_type) = part.content_type() {
        head.push_str(&format!(
            "Content-Type: {}\r\n",
            header_safe("content type", content_type.as_str())?
        ));
    }
    head.push_str("\r\n");
    out.extend_from_slice(head.as_bytes());
    Ok(())
}

fn header_safe<'v>(label: &str, value: &'v str) -> Result<&'v str, CodecError> {
    if value.contains(['"', '\r', '\n']) {
        Err(CodecError::multipart(format!(
            "part {label} '{}' contains a quote or line break",
            value.escape_debug()
        )))
    } else {
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Reads `multipart/form-data` bodies into [`MultipartForm`] values.
///
/// Parts with an `application/json` content type become [`PartBody::Json`],
/// parts with a filename become [`PartBody::Binary`], and the remaining parts
/// become [`PartBody::Text`] when they are valid UTF-8.
#[derive(Debug, Clone)]
pub struct MultipartReader {
    mapper: Arc<dyn JsonMapper>,
}

impl MultipartReader {
    /// Creates a reader that decodes JSON parts through `mapper`.
    pub fn new(mapper: Arc<dyn JsonMapper>) -> Self {
        Self { mapper }
    }

    fn parse_part(&self, head: &str, content: &[u8]) -> Result<Part, CodecError> {
        let mut name = None;
        let mut filename = None;
        let mut content_type = None;

        for line in head.split("\r\n").filter(|line| !line.is_empty()) {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| CodecError::multipart(format!("malformed part header '{line}'")))?;
            let key = key.trim();
            let value = value.trim();
            if key.eq_ignore_ascii_case("content-disposition") {
                for param in split_params(value).into_iter().skip(1) {
                    let Some((k, v)) = param.split_once('=') else {
                        continue;
                    };
                    let v = unquote(v.trim()).to_string();
                    match k.trim().to_ascii_lowercase().as_str() {
                        "name" => name = Some(v),
                        "filename" => filename = Some(v.replace("%22", "\"")),
                        _ => {}
                    }
                }
            } else if key.eq_ignore_ascii_case("content-type") {
                content_type = ContentType::new(value);
            }
        }

        let name = name.ok_or_else(|| CodecError::multipart("part without a name"))?;
        let body = match &content_type {
            Some(ct) if ct.is(ContentType::APPLICATION_JSON) => {
                PartBody::Json(self.mapper.from_bytes(content, &name)?)
            }
            _ if filename.is_some() => PartBody::Binary(content.to_vec()),
            Some(ct) if !ct.is_type("text") => PartBody::Binary(content.to_vec()),
            _ => match std::str::from_utf8(content) {
                Ok(text) => PartBody::Text(text.to_string()),
                Err(_) => PartBody::Binary(content.to_vec()),
            },
        };
        Ok(Part::new(name, filename, content_type, body))
    }
}

impl ReaderStrategy for MultipartReader {
    fn name(&self) -> &'static str {
        "multipart"
    }

    fn can_read(&self, target: &TypeDescriptor, content_type: Option<&ContentType>) -> bool {
        target.is_multipart()
            && content_type.is_some_and(|ct| ct.is(ContentType::MULTIPART_FORM_DATA))
    }

    fn read(&self, payload: &Payload, _target: &TypeDescriptor) -> Result<Decoded, CodecError> {
        let boundary = payload
            .content_type()
            .and_then(|ct| ct.parameter("boundary"))
            .filter(|b| !b.is_empty())
            .ok_or_else(|| CodecError::multipart("content type has no boundary parameter"))?;

        let body = payload.body.as_slice();
        let delimiter = format!("--{boundary}").into_bytes();
        let mut separator = CRLF.to_vec();
        separator.extend_from_slice(&delimiter);

        let mut pos = find(body, &delimiter, 0)
            .ok_or_else(|| CodecError::multipart("missing opening boundary"))?
            + delimiter.len();
        let mut form = MultipartForm::new();

        loop {
            let rest = &body[pos..];
            if rest.starts_with(b"--") {
                break;
            }
            if !rest.starts_with(CRLF) {
                return Err(CodecError::multipart("malformed or truncated boundary line"));
            }
            pos += CRLF.len();

            let (head, content_start) = if body[pos..].starts_with(CRLF) {
                ("", pos + CRLF.len())
            } else {
                let end = find(body, b"\r\n\r\n", pos)
                    .ok_or_else(|| CodecError::multipart("unterminated part headers"))?;
                let head = std::str::from_utf8(&body[pos..end])
                    .map_err(|_| CodecError::multipart("part headers are not UTF-8"))?;
                (head, end + 4)
            };

            let content_end = find(body, &separator, content_start)
                .ok_or_else(|| CodecError::multipart("missing closing boundary"))?;
            form = form.part(self.parse_part(head, &body[content_start..content_end])?);
            pos = content_end + separator.len();
        }

        debug!(parts = form.parts().len(), "Decoded multipart form");
        Ok(Decoded::Form(form))
    }
}

/// Splits header parameters on `;`, ignoring separators inside quotes.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(value[start..].trim());
    params
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use exchange::Describe;

    use super::*;
    use crate::SerdeJsonMapper;

    fn mapper() -> Arc<dyn JsonMapper> {
        Arc::new(SerdeJsonMapper::new())
    }

    fn form_payload(boundary: &str, body: &str) -> Payload {
        Payload::new(
            body.as_bytes().to_vec(),
            Some(ContentType::multipart_form_data(boundary)),
        )
    }

    #[test]
    fn writer_claims_forms_only() {
        let writer = MultipartWriter::new(mapper());

        assert!(writer.can_write(&MultipartForm::describe(), None));
        assert!(writer.can_write(
            &MultipartForm::describe(),
            ContentType::new("multipart/form-data").as_ref()
        ));
        assert!(!writer.can_write(&MultipartForm::describe(), Some(&ContentType::json())));
        assert!(!writer.can_write(&String::describe(), None));
    }

    #[test]
    fn writer_frames_each_part() {
        let form = MultipartForm::new()
            .json("payload_json", serde_json::json!({ "content": "hi" }))
            .file("file", "cat.png", vec![0x89, b'P', b'N', b'G'], None);

        let payload = MultipartWriter::new(mapper())
            .write(&Outbound::form(&form))
            .unwrap();
        let content_type = payload.content_type().unwrap();
        let boundary = content_type.parameter("boundary").unwrap().to_string();
        let body = String::from_utf8_lossy(&payload.body);

        assert!(content_type.is(ContentType::MULTIPART_FORM_DATA));
        assert_eq!(body.matches(&format!("--{boundary}\r\n")).count(), 2);
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
        assert!(body.contains("Content-Disposition: form-data; name=\"payload_json\"\r\n"));
        assert!(body.contains("Content-Type: application/json\r\n\r\n{\"content\":\"hi\"}\r\n"));
        assert!(body.contains("name=\"file\"; filename=\"cat.png\"\r\n"));
        assert!(body.contains("Content-Type: application/octet-stream\r\n"));
    }

    #[test]
    fn writer_rejects_empty_form() {
        let form = MultipartForm::new();

        let err = MultipartWriter::new(mapper())
            .write(&Outbound::form(&form))
            .unwrap_err();

        assert!(matches!(err, CodecError::Multipart { .. }));
    }

    #[test]
    fn writer_rejects_line_breaks_in_part_names() {
        let form = MultipartForm::new().text("bad\r\nX-Injected: 1", "v");

        let err = MultipartWriter::new(mapper())
            .write(&Outbound::form(&form))
            .unwrap_err();

        assert!(err.to_string().contains("line break"));
    }

    #[test]
    fn quotes_in_filenames_are_percent_encoded() {
        let form = MultipartForm::new().file("file", "say \"hi\".txt", b"hi".to_vec(), None);
        let writer = MultipartWriter::new(mapper());

        let payload = writer.write(&Outbound::form(&form)).unwrap();
        let body = String::from_utf8_lossy(&payload.body);
        assert!(body.contains("filename=\"say %22hi%22.txt\"\r\n"));

        let read_back = MultipartReader::new(mapper())
            .read(&payload, &MultipartForm::describe())
            .unwrap()
            .into_form()
            .unwrap();
        assert_eq!(read_back.parts()[0].filename(), Some("say \"hi\".txt"));
    }

    #[test]
    fn writer_rejects_line_breaks_in_filenames() {
        let form = MultipartForm::new().file("file", "a\r\nb.txt", b"x".to_vec(), None);

        let err = MultipartWriter::new(mapper())
            .write(&Outbound::form(&form))
            .unwrap_err();

        assert!(err.to_string().contains("line break"));
    }

    #[test]
    fn reader_parses_hand_written_body() {
        let body = "preamble\r\n--XyZ\r\n\
            Content-Disposition: form-data; name=\"greeting\"\r\n\r\n\
            hello\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"doc\"; filename=\"a;b.txt\"\r\n\
            Content-Type: text/plain\r\n\r\n\
            line1\r\nline2\r\n\
            --XyZ--\r\n";

        let decoded = MultipartReader::new(mapper())
            .read(&form_payload("XyZ", body), &MultipartForm::describe())
            .unwrap();
        let form = decoded.into_form().unwrap();

        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.parts()[0], Part::text("greeting", "hello"));
        assert_eq!(form.parts()[1].filename(), Some("a;b.txt"));
        assert_eq!(
            form.parts()[1].body(),
            &PartBody::Binary(b"line1\r\nline2".to_vec())
        );
    }

    #[test]
    fn reader_requires_boundary_parameter() {
        let payload = Payload::new(b"--x--".to_vec(), ContentType::new("multipart/form-data"));

        let err = MultipartReader::new(mapper())
            .read(&payload, &MultipartForm::describe())
            .unwrap_err();

        assert!(err.to_string().contains("boundary"));
    }

    #[test]
    fn reader_rejects_truncated_body() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue";

        let err = MultipartReader::new(mapper())
            .read(&form_payload("b", body), &MultipartForm::describe())
            .unwrap_err();

        assert!(err.to_string().contains("missing closing boundary"));
    }

    #[test]
    fn reader_rejects_body_ending_after_delimiter() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue\r\n--b";

        let err = MultipartReader::new(mapper())
            .read(&form_payload("b", body), &MultipartForm::describe())
            .unwrap_err();

        assert!(matches!(err, CodecError::Multipart { .. }));
    }

    #[test]
    fn reader_rejects_unnamed_parts() {
        let body = "--b\r\nContent-Type: text/plain\r\n\r\nvalue\r\n--b--\r\n";

        let err = MultipartReader::new(mapper())
            .read(&form_payload("b", body), &MultipartForm::describe())
            .unwrap_err();

        assert!(err.to_string().contains("without a name"));
    }

    #[test]
    fn split_params_respects_quotes() {
        assert_eq!(
            split_params("form-data; name=\"a\"; filename=\"x;y\""),
            ["form-data", "name=\"a\"", "filename=\"x;y\""]
        );
    }
}
