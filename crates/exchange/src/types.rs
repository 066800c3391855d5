//! Value types shared by every strategy: content types, payloads and type
//! descriptors.
//!
//! A [`TypeDescriptor`] is what capability predicates inspect. It carries the
//! type's name (for diagnostics) and its [`TypeShape`], which is enough to tell
//! an absent value, a single object, a collection of objects and a multipart
//! form apart without looking at the value itself.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// A content-type label identifying the wire format of a body
/// (e.g. `"application/json"`, `"multipart/form-data; boundary=abc"`).
///
/// The raw header value is kept verbatim. Matching is done on the
/// [essence](ContentType::essence): the lower-cased `type/subtype` with all
/// parameters removed. There is no wildcard or suffix matching, so
/// `application/vnd.api+json` does not match `application/json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentType(String);

impl ContentType {
    /// Essence of the structured (JSON) content type.
    pub const APPLICATION_JSON: &'static str = "application/json";

    /// Essence of the multipart form content type.
    pub const MULTIPART_FORM_DATA: &'static str = "multipart/form-data";

    /// Essence used for binary parts without an explicit content type.
    pub const OCTET_STREAM: &'static str = "application/octet-stream";

    /// Creates a content type from a raw header value, returning `None` if the
    /// value is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v))
        }
    }

    /// `application/json`.
    pub fn json() -> Self {
        Self(Self::APPLICATION_JSON.to_string())
    }

    /// `multipart/form-data` with the given boundary parameter.
    pub fn multipart_form_data(boundary: &str) -> Self {
        Self(format!("{}; boundary={}", Self::MULTIPART_FORM_DATA, boundary))
    }

    /// `application/octet-stream`.
    pub fn octet_stream() -> Self {
        Self(Self::OCTET_STREAM.to_string())
    }

    /// Returns the raw header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lower-cased `type/subtype` with parameters stripped.
    pub fn essence(&self) -> String {
        self.essence_str().to_ascii_lowercase()
    }

    /// Returns `true` if this content type's essence equals `essence`
    /// (ASCII case-insensitive).
    pub fn is(&self, essence: &str) -> bool {
        self.essence_str().eq_ignore_ascii_case(essence)
    }

    /// Returns `true` if the top-level type equals `top_level` (e.g. `"text"`).
    pub fn is_type(&self, top_level: &str) -> bool {
        self.essence_str()
            .split('/')
            .next()
            .is_some_and(|t| t.eq_ignore_ascii_case(top_level))
    }

    /// Looks up a parameter by name (case-insensitive), unquoting its value.
    ///
    /// `ContentType::new("multipart/form-data; boundary=\"xyz\"")` yields
    /// `Some("xyz")` for `parameter("boundary")`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.0.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case(name) {
                let value = value.trim();
                Some(
                    value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value),
                )
            } else {
                None
            }
        })
    }

    fn essence_str(&self) -> &str {
        self.0.split(';').next().unwrap_or_default().trim()
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Predicate helper: `true` when `content_type` is unset or has the given essence.
///
/// This is the matching rule used by the default strategies: a caller that
/// does not declare a content type defers to the strategy's own format.
pub fn unset_or_is(content_type: Option<&ContentType>, essence: &str) -> bool {
    content_type.is_none_or(|ct| ct.is(essence))
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A raw body plus the content type to send with it (or that it arrived with).
///
/// Produced by writers and handed to the transport; built by the transport from
/// a response and handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    /// Body bytes. Zero-length for empty bodies.
    pub body: Vec<u8>,
    /// Content-type header value. `None` means no header is sent / was received.
    pub content_type: Option<ContentType>,
}

impl Payload {
    /// Creates a payload from body bytes and an optional content type.
    pub fn new(body: impl Into<Vec<u8>>, content_type: Option<ContentType>) -> Self {
        Self {
            body: body.into(),
            content_type,
        }
    }

    /// A zero-length payload with no content type.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the body is zero-length.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the content type, if any.
    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Type descriptors
// ---------------------------------------------------------------------------

/// Structural classification of a value type, as seen by capability predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// No value: `()`, or an absent optional body (e.g. a `DELETE` request).
    Void,
    /// A single serialisable value (record, map, scalar).
    Object,
    /// A sequence of values of one element type.
    Collection {
        /// Descriptor of the element type.
        element: Box<TypeDescriptor>,
    },
    /// A composite form with one or more named parts, possibly binary.
    Multipart,
}

/// A value type's name together with its [`TypeShape`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: Cow<'static, str>,
    shape: TypeShape,
}

impl TypeDescriptor {
    /// Creates a descriptor from a name and a shape.
    pub fn new(name: impl Into<Cow<'static, str>>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Descriptor of the absent value.
    pub fn void() -> Self {
        Self::new("()", TypeShape::Void)
    }

    /// [`TypeShape::Object`] descriptor named after `T`.
    pub fn object<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>(), TypeShape::Object)
    }

    /// [`TypeShape::Collection`] descriptor named after `T` with the given element.
    pub fn collection<T: ?Sized>(element: TypeDescriptor) -> Self {
        Self::new(
            std::any::type_name::<T>(),
            TypeShape::Collection {
                element: Box::new(element),
            },
        )
    }

    /// Returns the descriptor `T` reports through [`Describe`].
    pub fn of<T: Describe + ?Sized>() -> Self {
        T::describe()
    }

    /// Returns the type name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shape.
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Returns the element descriptor for collections, `None` otherwise.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match &self.shape {
            TypeShape::Collection { element } => Some(element),
            _ => None,
        }
    }

    /// Returns `true` for [`TypeShape::Void`].
    pub fn is_void(&self) -> bool {
        matches!(self.shape, TypeShape::Void)
    }

    /// Returns `true` for [`TypeShape::Multipart`].
    pub fn is_multipart(&self) -> bool {
        matches!(self.shape, TypeShape::Multipart)
    }

    /// Returns `true` for shapes carried as structured text (objects and collections).
    pub fn is_structured(&self) -> bool {
        matches!(
            self.shape,
            TypeShape::Object | TypeShape::Collection { .. }
        )
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Types that can report their [`TypeDescriptor`] without a value at hand.
///
/// Records implement this with [`describe_object!`](crate::describe_object);
/// containers derive their descriptor from their element type.
pub trait Describe {
    /// Returns the descriptor for `Self`.
    fn describe() -> TypeDescriptor;

    /// Returns `true` if this value stands for "no body" (e.g. `None`).
    fn is_absent(&self) -> bool {
        false
    }
}

/// Implements [`Describe`] as [`TypeShape::Object`] for each listed type.
///
/// ```
/// struct Guild;
///
/// exchange::describe_object!(Guild);
///
/// assert!(exchange::TypeDescriptor::of::<Guild>().is_structured());
/// ```
#[macro_export]
macro_rules! describe_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Describe for $ty {
                fn describe() -> $crate::TypeDescriptor {
                    $crate::TypeDescriptor::object::<$ty>()
                }
            }
        )+
    };
}

impl Describe for () {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::void()
    }
}

describe_object!(
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    str,
    serde_json::Value,
);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<Vec<T>>(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::collection::<[T]>(T::describe())
    }
}

impl<K, V> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::object::<HashMap<K, V>>()
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::object::<BTreeMap<K, V>>()
    }
}

// An optional body is described by its inner type; `None` is absent.
impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }

    fn is_absent(&self) -> bool {
        self.as_ref().is_none_or(T::is_absent)
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDescriptor {
        T::describe()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn essence_ignores_parameters_and_case() {
        let ct = ContentType::new("Application/JSON; charset=utf-8").unwrap();

        assert_eq!(ct.essence(), "application/json");
        assert!(ct.is(ContentType::APPLICATION_JSON));
        assert!(!ct.is("application/vnd.api+json"));
        assert!(ct.is_type("application"));
    }

    #[test]
    fn parameter_lookup_unquotes_values() {
        let ct = ContentType::new("multipart/form-data; Boundary=\"abc 123\"").unwrap();

        assert_eq!(ct.parameter("boundary"), Some("abc 123"));
        assert_eq!(ct.parameter("charset"), None);
        assert_eq!(
            ContentType::multipart_form_data("xyz").parameter("boundary"),
            Some("xyz")
        );
    }

    #[test]
    fn blank_content_type_is_rejected() {
        assert!(ContentType::new("").is_none());
        assert!(ContentType::new("   ").is_none());
    }

    #[test]
    fn unset_or_is_accepts_missing_content_type() {
        assert!(unset_or_is(None, ContentType::APPLICATION_JSON));
        assert!(unset_or_is(Some(&ContentType::json()), ContentType::APPLICATION_JSON));
        assert!(!unset_or_is(
            Some(&ContentType::octet_stream()),
            ContentType::APPLICATION_JSON
        ));
    }

    #[test]
    fn collection_of_objects_is_distinct_from_object() {
        let list = TypeDescriptor::of::<Vec<String>>();
        let single = TypeDescriptor::of::<String>();

        assert_ne!(list.shape(), single.shape());
        assert_eq!(list.element(), Some(&single));
        assert!(single.element().is_none());
        assert!(list.is_structured() && single.is_structured());
    }

    #[test]
    fn option_and_unit_descriptors() {
        assert_eq!(TypeDescriptor::of::<Option<u64>>(), TypeDescriptor::of::<u64>());
        assert!(TypeDescriptor::of::<()>().is_void());
    }
}
