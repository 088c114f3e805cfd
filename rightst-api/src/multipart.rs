//! Minimal `multipart/form-data` body builder for attachment uploads.
//!
//! `ureq` 2 has no multipart support, so the body is assembled in memory.

use std::io::{self, Read};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Self::with_boundary(format!("right-st-{nanos:x}-{:x}", std::process::id()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(name, None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file field, reading `content` to the end.
    pub fn file(mut self, name: &str, filename: &str, content: &mut dyn Read) -> io::Result<Self> {
        self.open_part(name, Some(filename));
        content.read_to_end(&mut self.body)?;
        self.body.extend_from_slice(b"\r\n");
        Ok(self)
    }

    /// Close the body and return it.
    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }

    fn open_part(&mut self, name: &str, filename: Option<&str>) {
        let mut head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.boundary,
            quote(name)
        );
        if let Some(filename) = filename {
            head.push_str(&format!("; filename=\"{}\"", quote(filename)));
            head.push_str("\r\nContent-Type: application/octet-stream");
        }
        head.push_str("\r\n\r\n");
        self.body.extend_from_slice(head.as_bytes());
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-escape the characters that would end a quoted header parameter,
/// as browsers do for form-data names (RFC 7578 section 4.2).
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("%22"),
            '\r' => quoted.push_str("%0D"),
            '\n' => quoted.push_str("%0A"),
            c => quoted.push(c),
        }
    }
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_layout() {
        let form = Multipart::with_boundary("XYZ")
            .text("right_script_attachment[name]", "nginx.conf")
            .file(
                "right_script_attachment[content]",
                "nginx.conf",
                &mut &b"worker_processes 1;"[..],
            )
            .unwrap();
        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");

        let body = String::from_utf8(form.finish()).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"right_script_attachment[name]\"\r\n\r\n\
             nginx.conf\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"right_script_attachment[content]\"; filename=\"nginx.conf\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             worker_processes 1;\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn header_values_cannot_break_out() {
        let form = Multipart::with_boundary("B").text("a\"b\r\nc", "v");
        let body = String::from_utf8(form.finish()).unwrap();
        assert!(body.contains("name=\"a%22b%0D%0Ac\""));
    }

    #[test]
    fn quoted_filenames_are_percent_escaped() {
        let form = Multipart::with_boundary("B")
            .file("f", "say \"hi\".txt", &mut &b"x"[..])
            .unwrap();
        let body = String::from_utf8(form.finish()).unwrap();
        assert!(body.contains("filename=\"say %22hi%22.txt\""), "{body}");
    }

    #[test]
    fn generated_boundaries_are_prefixed() {
        assert!(Multipart::new().content_type().contains("boundary=right-st-"));
    }
}
