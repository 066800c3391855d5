//! Values crossing the exchange layer.
//!
//! [`Outbound`] is what a caller hands in for encoding: a borrowed value plus
//! its [`TypeDescriptor`]. [`Decoded`] is what a reader hands back before it is
//! converted into the caller's target type.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{CodecError, ContentType, Describe, TypeDescriptor, TypeShape};

// ---------------------------------------------------------------------------
// Outbound values
// ---------------------------------------------------------------------------

/// Object-safe view of a `Serialize` value.
trait ErasedSerialize: Sync {
    fn to_structured(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T: Serialize + Sync> ErasedSerialize for T {
    fn to_structured(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Clone, Copy)]
enum Content<'a> {
    Absent,
    Serializable(&'a dyn ErasedSerialize),
    Form(&'a MultipartForm),
}

/// A value offered for encoding, together with its declared type.
///
/// The value is borrowed: encoding happens synchronously before the request
/// is sent, so nothing needs to outlive the call.
#[derive(Clone)]
pub struct Outbound<'a> {
    descriptor: TypeDescriptor,
    content: Content<'a>,
}

impl Outbound<'static> {
    /// No body (e.g. `DELETE` requests).
    pub fn absent() -> Self {
        Self {
            descriptor: TypeDescriptor::void(),
            content: Content::Absent,
        }
    }
}

impl<'a> Outbound<'a> {
    /// A serialisable value described by its [`Describe`] implementation.
    ///
    /// Values that report themselves absent (`None`) become
    /// [`Outbound::absent`].
    pub fn value<T: Serialize + Describe + Sync>(value: &'a T) -> Self {
        if value.is_absent() {
            return Outbound::absent();
        }
        Self::described(value, T::describe())
    }

    /// A serialisable value with an explicit descriptor.
    pub fn described<T: Serialize + Sync>(value: &'a T, descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            content: Content::Serializable(value),
        }
    }

    /// `Some` becomes [`Outbound::value`], `None` becomes [`Outbound::absent`].
    pub fn option<T: Serialize + Describe + Sync>(value: Option<&'a T>) -> Self {
        match value {
            Some(v) => Self::value(v),
            None => Outbound::absent(),
        }
    }

    /// A multipart form.
    pub fn form(form: &'a MultipartForm) -> Self {
        Self {
            descriptor: MultipartForm::describe(),
            content: Content::Form(form),
        }
    }

    /// Returns the declared type.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Returns `true` if there is no value.
    pub fn is_absent(&self) -> bool {
        matches!(self.content, Content::Absent)
    }

    /// Returns the form if this value is one.
    pub fn as_form(&self) -> Option<&'a MultipartForm> {
        match self.content {
            Content::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Maps the value into its structured representation.
    ///
    /// Returns `None` for absent values and forms.
    pub fn to_structured(&self) -> Option<Result<serde_json::Value, CodecError>> {
        match self.content {
            Content::Serializable(value) => {
                Some(value.to_structured().map_err(|source| CodecError::Serialize {
                    type_name: self.descriptor.name().to_string(),
                    source,
                }))
            }
            Content::Absent | Content::Form(_) => None,
        }
    }
}

impl std::fmt::Debug for Outbound<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content = match self.content {
            Content::Absent => "absent",
            Content::Serializable(_) => "serializable",
            Content::Form(_) => "form",
        };
        f.debug_struct("Outbound")
            .field("descriptor", &self.descriptor)
            .field("content", &content)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Decoded values
// ---------------------------------------------------------------------------

/// The result of a reader strategy, prior to conversion into a target type.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// No value: a zero-length body or a void target.
    Absent,
    /// A structured value (JSON document).
    Structured(serde_json::Value),
    /// A parsed multipart form.
    Form(MultipartForm),
}

impl Decoded {
    /// Returns `true` for [`Decoded::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }

    /// Converts into `T`. Absent values become `None`.
    ///
    /// Forms cannot be converted into arbitrary types; use [`Decoded::into_form`].
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<Option<T>, CodecError> {
        match self {
            Decoded::Absent => Ok(None),
            Decoded::Structured(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| CodecError::Deserialize {
                    type_name: std::any::type_name::<T>().to_string(),
                    source,
                }),
            Decoded::Form(_) => Err(CodecError::UnsupportedValue {
                strategy: "typed conversion",
                type_name: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    /// Returns the form if this is [`Decoded::Form`].
    pub fn into_form(self) -> Option<MultipartForm> {
        match self {
            Decoded::Form(form) => Some(form),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Multipart forms
// ---------------------------------------------------------------------------

/// Body of a single form part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    /// A structured field, encoded with the structured codec.
    Json(serde_json::Value),
    /// A plain text field.
    Text(String),
    /// Raw bytes, typically a file upload.
    Binary(Vec<u8>),
}

/// One named part of a [`MultipartForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<ContentType>,
    body: PartBody,
}

impl Part {
    /// Creates a part from all of its components.
    pub fn new(
        name: impl Into<String>,
        filename: Option<String>,
        content_type: Option<ContentType>,
        body: PartBody,
    ) -> Self {
        Self {
            name: name.into(),
            filename,
            content_type,
            body,
        }
    }

    /// A structured field sent as `application/json`.
    pub fn json(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(name, None, Some(ContentType::json()), PartBody::Json(value))
    }

    /// A plain text field with no part content type.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, None, None, PartBody::Text(text.into()))
    }

    /// A file upload. Defaults to `application/octet-stream`.
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        content_type: Option<ContentType>,
    ) -> Self {
        Self::new(
            name,
            Some(filename.into()),
            Some(content_type.unwrap_or_else(ContentType::octet_stream)),
            PartBody::Binary(bytes.into()),
        )
    }

    /// Returns the form field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the filename, for file parts.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the part's own content type, if any.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    /// Returns the part body.
    pub fn body(&self) -> &PartBody {
        &self.body
    }

    /// Returns `true` if the body is raw bytes.
    pub fn is_binary(&self) -> bool {
        matches!(self.body, PartBody::Binary(_))
    }
}

/// A composite body: an ordered list of named parts, typically a JSON payload
/// alongside one or more file uploads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a part.
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Appends a structured field.
    pub fn json(self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.part(Part::json(name, value))
    }

    /// Appends a plain text field.
    pub fn text(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.part(Part::text(name, text))
    }

    /// Appends a file upload.
    pub fn file(
        self,
        name: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        content_type: Option<ContentType>,
    ) -> Self {
        self.part(Part::file(name, filename, bytes, content_type))
    }

    /// Returns the parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns `true` if the form has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns `true` if at least one part carries raw bytes.
    pub fn has_binary(&self) -> bool {
        self.parts.iter().any(Part::is_binary)
    }
}

impl Describe for MultipartForm {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(std::any::type_name::<MultipartForm>(), TypeShape::Multipart)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn absent_value_is_void() {
        let value = Outbound::absent();

        assert!(value.is_absent());
        assert!(value.descriptor().is_void());
        assert!(value.to_structured().is_none());
    }

    #[test]
    fn option_none_is_absent() {
        let value = Outbound::option::<String>(None);

        assert!(value.is_absent());
    }

    #[test]
    fn none_passed_as_value_is_absent() {
        let missing: Option<String> = None;
        let nested: Option<Option<u64>> = Some(None);

        assert!(Outbound::value(&missing).is_absent());
        assert!(Outbound::value(&missing).descriptor().is_void());
        assert!(Outbound::value(&nested).is_absent());
        assert!(!Outbound::value(&Some(3_u64)).is_absent());
    }

    #[test]
    fn serializable_value_maps_to_structured() {
        let map = BTreeMap::from([("key".to_string(), "value".to_string())]);
        let value = Outbound::value(&map);

        let structured = value.to_structured().unwrap().unwrap();
        assert_eq!(structured, serde_json::json!({ "key": "value" }));
    }

    #[test]
    fn unserialisable_value_reports_type() {
        // JSON object keys must be strings.
        let map = BTreeMap::from([(vec![1u8], 1u8)]);
        let value = Outbound::described(&map, TypeDescriptor::object::<BTreeMap<Vec<u8>, u8>>());

        let err = value.to_structured().unwrap().unwrap_err();
        assert!(matches!(err, CodecError::Serialize { .. }));
    }

    #[test]
    fn form_outbound_carries_multipart_shape() {
        let form = MultipartForm::new().file("file", "a.png", vec![1, 2, 3], None);
        let value = Outbound::form(&form);

        assert!(value.descriptor().is_multipart());
        assert_eq!(value.as_form(), Some(&form));
        assert!(form.has_binary());
    }

    #[test]
    fn decoded_absent_is_none_for_any_type() {
        assert_eq!(Decoded::Absent.into_typed::<u64>().unwrap(), None);
        assert_eq!(Decoded::Absent.into_typed::<Vec<String>>().unwrap(), None);
    }

    #[test]
    fn decoded_type_mismatch_is_codec_error() {
        let err = Decoded::Structured(serde_json::json!("text"))
            .into_typed::<u64>()
            .unwrap_err();

        assert!(matches!(err, CodecError::Deserialize { .. }));
    }
}
