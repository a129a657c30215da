use uuid::Uuid;

/// Incrementally built `multipart/form-data` body.
///
/// Parts are written in the order they are added; [`MultipartBody::finish`]
/// appends the closing delimiter.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::with_boundary(format!("Boundary-{}", Uuid::new_v4()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        MultipartBody {
            boundary: boundary.into(),
            buf: Vec::new(),
        }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.delimiter();
        self.line(&format!("Content-Disposition: form-data; name=\"{name}\""));
        self.line("");
        self.buf.extend_from_slice(value.as_bytes());
        self.line("");
        self
    }

    pub fn file(&mut self, name: &str, filename: &str, mime: &str, data: &[u8]) -> &mut Self {
        self.delimiter();
        self.line(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\""
        ));
        self.line(&format!("Content-Type: {mime}"));
        self.line("");
        self.buf.extend_from_slice(data);
        self.line("");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        let closing = format!("--{}--", self.boundary);
        self.line(&closing);
        self.buf
    }

    fn delimiter(&mut self) {
        let delimiter = format!("--{}", self.boundary);
        self.line(&delimiter);
    }

    fn line(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}
