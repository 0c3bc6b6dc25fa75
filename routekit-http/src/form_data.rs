//! Multipart form payloads.

use bytes::Bytes;
use serde_json::Value;

use crate::{Error, Result};

/// Binary form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw content.
    pub data: Bytes,
    /// File name sent with the part.
    pub file_name: Option<String>,
    /// MIME type of the part.
    pub mime: Option<String>,
}

impl Blob {
    /// Create a blob from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            mime: None,
        }
    }

    /// Set the file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the MIME type.
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Text field.
    Text(String),
    /// File field.
    Blob(Blob),
}

/// Ordered multipart form entries. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    /// Create an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a JSON object into form entries.
    ///
    /// Arrays produce one entry per element, nested objects and arrays are
    /// sent as JSON text, strings as-is and other scalars via their JSON
    /// rendering. Anything but an object yields an empty form.
    pub fn from_value(value: &Value) -> Self {
        let mut form = Self::new();
        let Value::Object(map) = value else {
            return form;
        };

        for (key, property) in map {
            match property {
                Value::Array(items) => {
                    for item in items {
                        form.append_text(key.clone(), field_text(item));
                    }
                }
                other => form.append_text(key.clone(), field_text(other)),
            }
        }
        form
    }

    /// Append a text field.
    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .push((name.into(), FormValue::Text(value.into())));
    }

    /// Append a binary field.
    pub fn append_blob(&mut self, name: impl Into<String>, blob: Blob) {
        self.entries.push((name.into(), FormValue::Blob(blob)));
    }

    /// Append every entry of another form.
    pub fn extend(&mut self, other: FormData) {
        self.entries.extend(other.entries);
    }

    /// Builder-style [`append_text`](Self::append_text).
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_text(name, value);
        self
    }

    /// Builder-style [`append_blob`](Self::append_blob).
    pub fn blob(mut self, name: impl Into<String>, blob: Blob) -> Self {
        self.append_blob(name, blob);
        self
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, FormValue)] {
        &self.entries
    }

    /// All values for a key.
    pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// Whether the form has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Convert to a reqwest multipart form.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.entries {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::Blob(blob) => {
                    let mut part = reqwest::multipart::Part::bytes(blob.data.to_vec());
                    if let Some(file_name) = blob.file_name {
                        part = part.file_name(file_name);
                    }
                    if let Some(mime) = blob.mime {
                        part = part
                            .mime_str(&mime)
                            .map_err(|e| Error::RequestBuild(e.to_string()))?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(value: &str) -> FormValue {
        FormValue::Text(value.to_string())
    }

    #[test]
    fn test_nested_objects_become_json() {
        let form = FormData::from_value(&json!({ "value": { "deep": 42 } }));

        assert_eq!(form.entries(), &[("value".to_string(), text(r#"{"deep":42}"#))]);
    }

    #[test]
    fn test_struct_field_order_is_kept() {
        #[derive(serde::Serialize)]
        struct Book {
            title: String,
            author: String,
        }

        let book = Book {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
        };
        let form = FormData::from_value(&serde_json::to_value(&book).unwrap());

        let names: Vec<&str> = form.entries().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["title", "author"]);
    }

    #[test]
    fn test_scalars_are_stringified() {
        let form = FormData::from_value(&json!({
            "name": "widget",
            "count": 5,
            "active": true,
            "note": null
        }));

        assert_eq!(form.get_all("name"), vec![&text("widget")]);
        assert_eq!(form.get_all("count"), vec![&text("5")]);
        assert_eq!(form.get_all("active"), vec![&text("true")]);
        assert_eq!(form.get_all("note"), vec![&text("null")]);
    }

    #[test]
    fn test_arrays_repeat_the_key() {
        let form = FormData::from_value(&json!({ "tags": ["a", { "b": 1 }, 3] }));

        assert_eq!(
            form.get_all("tags"),
            vec![&text("a"), &text(r#"{"b":1}"#), &text("3")]
        );
    }

    #[test]
    fn test_non_object_payload_is_empty() {
        for value in [json!(null), json!(1), json!(""), json!([1, 2])] {
            assert!(FormData::from_value(&value).is_empty());
        }
    }

    #[test]
    fn test_blobs_are_kept() {
        let blob = Blob::new(&b"PNG"[..]).file_name("logo.png").mime("image/png");
        let form = FormData::new().text("title", "logo").blob("file", blob.clone());

        assert_eq!(form.len(), 2);
        assert_eq!(form.get_all("file"), vec![&FormValue::Blob(blob)]);
        assert!(form.into_multipart().is_ok());
    }

    #[test]
    fn test_invalid_mime_is_rejected() {
        let form = FormData::new().blob("file", Blob::new(&b"x"[..]).mime("not a mime"));

        assert!(matches!(form.into_multipart(), Err(Error::RequestBuild(_))));
    }
}
