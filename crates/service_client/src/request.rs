use std::fmt;

use serde_json::Value;

use crate::service::LogicalService;

/// HTTP verbs the services expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Uploaded file inside a form body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Form body; sent as `multipart/form-data` over HTTP.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl FormBody {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// First value of a text field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn get_file(&self, field: &str) -> Option<&FilePart> {
        self.files.iter().find(|f| f.field == field)
    }

    pub(crate) fn into_multipart(self) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let mut form = reqwest::multipart::Form::new();
        for (k, v) in self.fields {
            form = form.text(k, v);
        }
        for f in self.files {
            let mut part = reqwest::multipart::Part::bytes(f.bytes).file_name(f.filename);
            if let Some(ct) = f.content_type.as_deref() {
                part = part.mime_str(ct)?;
            }
            form = form.part(f.field, part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Form(FormBody),
}

/// One call: created per request and dropped once the response is back.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub service: LogicalService,
    pub method: Method,
    /// Resource path relative to the service's API root, e.g. `/products/1`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Payload,
}

impl Invocation {
    pub fn new(service: LogicalService, method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') { path } else { format!("/{path}") };
        Self { service, method, path, query: Vec::new(), body: Payload::Empty }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Payload::Json(body);
        self
    }

    pub fn form(mut self, body: FormBody) -> Self {
        self.body = Payload::Form(body);
        self
    }

    /// Path split into non-empty segments, without any inline query string.
    pub fn segments(&self) -> Vec<&str> {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        path.split('/').filter(|s| !s.is_empty()).collect()
    }
}
