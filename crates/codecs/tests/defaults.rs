//! Behaviour of the default registry returned by `codecs::defaults`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use codecs::{
    defaults, defaults_builder, extend_with_defaults, JsonMapper, MultipartReader, SerdeJsonMapper,
};
use exchange::{
    describe_object, CodecError, ContentType, Decoded, Describe, ExchangeStrategies, MultipartForm,
    Outbound, Part, PartBody, Payload, TypeDescriptor, WriterStrategy,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Embed {
    title: String,
    color: Option<u32>,
    fields: Vec<(String, String)>,
}

describe_object!(Embed);

fn registry() -> ExchangeStrategies {
    defaults(Arc::new(SerdeJsonMapper::new()))
}

fn writer_names(registry: &ExchangeStrategies) -> Vec<&'static str> {
    registry.writers().iter().map(|w| w.name()).collect()
}

#[test]
fn default_order_is_multipart_json_empty() {
    let registry = registry();

    assert_eq!(writer_names(&registry), ["multipart", "json", "empty"]);
    let readers: Vec<_> = registry.readers().iter().map(|r| r.name()).collect();
    assert_eq!(readers, ["json", "empty"]);
}

#[test]
fn plain_mapping_selects_json_writer_and_round_trips() {
    let registry = registry();
    let mapping = BTreeMap::from([("key".to_string(), "value".to_string())]);
    let value = Outbound::value(&mapping);

    let writer = registry.resolve_writer(value.descriptor(), None).unwrap();
    assert_eq!(writer.name(), "json");

    let payload = registry.write(&value, None).unwrap();
    assert_eq!(payload.body, br#"{"key":"value"}"#);
    assert_eq!(payload.content_type, Some(ContentType::json()));

    let back: BTreeMap<String, String> = registry.decode(&payload).unwrap().unwrap();
    assert_eq!(back, mapping);
}

#[test]
fn structured_values_round_trip() {
    let registry = registry();
    let embed = Embed {
        title: "Release".to_string(),
        color: Some(0x5865F2),
        fields: vec![("version".to_string(), "1.2.0".to_string())],
    };
    let embeds = vec![embed.clone(), Embed { color: None, ..embed.clone() }];

    let payload = registry.write(&Outbound::value(&embed), None).unwrap();
    assert_eq!(registry.decode::<Embed>(&payload).unwrap(), Some(embed));

    let payload = registry.write(&Outbound::value(&embeds), None).unwrap();
    assert_eq!(registry.decode::<Vec<Embed>>(&payload).unwrap(), Some(embeds));

    let payload = registry.write(&Outbound::value(&-17i64), None).unwrap();
    assert_eq!(registry.decode::<i64>(&payload).unwrap(), Some(-17));
}

#[test]
fn form_with_binary_part_selects_multipart_writer() {
    let registry = registry();
    let form = MultipartForm::new()
        .json("payload_json", serde_json::json!({ "content": "see attached" }))
        .file("file", "log.txt", b"line one\nline two".to_vec(), None);
    let value = Outbound::form(&form);

    let writer = registry.resolve_writer(value.descriptor(), None).unwrap();
    assert_eq!(writer.name(), "multipart");

    let payload = registry.write(&value, None).unwrap();
    let content_type = payload.content_type().unwrap();
    let boundary = content_type.parameter("boundary").unwrap();
    let body = String::from_utf8(payload.body.clone()).unwrap();

    assert!(content_type.is(ContentType::MULTIPART_FORM_DATA));
    assert_eq!(body.matches(&format!("--{boundary}\r\n")).count(), 2);
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
}

#[test]
fn multipart_body_reads_back_into_equal_form() {
    let mapper: Arc<dyn JsonMapper> = Arc::new(SerdeJsonMapper::new());
    let mut builder = defaults_builder(Arc::clone(&mapper));
    builder.reader_strategy(MultipartReader::new(mapper));
    let registry = builder.build();

    let form = MultipartForm::new()
        .json("payload_json", serde_json::json!({ "tts": false, "nonce": 7 }))
        .text("note", "plain text")
        .file("file0", "a.bin", vec![0u8, 159, 146, 150, 13, 10], None)
        .file("file1", "b.png", vec![1u8, 2, 3], ContentType::new("image/png"));

    let payload = registry.write(&Outbound::form(&form), None).unwrap();
    let decoded = registry.read(&payload, &MultipartForm::describe()).unwrap();

    assert_eq!(decoded, Decoded::Form(form));
}

#[test]
fn absent_value_selects_empty_writer() {
    let registry = registry();
    let value = Outbound::absent();

    let writer = registry.resolve_writer(value.descriptor(), None).unwrap();
    assert_eq!(writer.name(), "empty");

    let payload = registry.write(&value, None).unwrap();
    assert!(payload.body.is_empty());
    assert!(payload.content_type.is_none());
}

#[test]
fn zero_length_body_reads_as_absent_for_any_target() {
    let registry = registry();

    for content_type in [None, Some(ContentType::json())] {
        let payload = Payload::new(Vec::new(), content_type);

        assert_eq!(registry.decode::<Embed>(&payload).unwrap(), None);
        assert_eq!(registry.decode::<Vec<u64>>(&payload).unwrap(), None);
        assert_eq!(registry.decode::<String>(&payload).unwrap(), None);
        assert_eq!(registry.decode::<()>(&payload).unwrap(), None);
    }
}

#[test]
fn zero_length_body_with_foreign_content_type_reads_as_absent() {
    let registry = registry();

    for content_type in ["text/plain; charset=utf-8", "application/octet-stream"] {
        let payload = Payload::new(Vec::new(), ContentType::new(content_type));

        assert_eq!(registry.decode::<String>(&payload).unwrap(), None);
        assert_eq!(registry.decode::<Embed>(&payload).unwrap(), None);
        assert_eq!(registry.decode::<()>(&payload).unwrap(), None);
    }
}

#[test]
fn none_value_writes_zero_length_body() {
    let registry = registry();
    let missing: Option<String> = None;

    let writer = registry
        .resolve_writer(Outbound::value(&missing).descriptor(), None)
        .unwrap();
    let payload = registry.write(&Outbound::value(&missing), None).unwrap();

    assert_eq!(writer.name(), "empty");
    assert!(payload.is_empty());
    assert!(payload.content_type().is_none());
}

#[test]
fn void_target_discards_any_body() {
    let registry = registry();
    let payload = Payload::new(br#"{"ignored":true}"#.to_vec(), Some(ContentType::json()));

    let decoded = registry.read(&payload, &TypeDescriptor::void()).unwrap();

    assert_eq!(decoded, Decoded::Absent);
}

#[test]
fn explicit_foreign_content_type_has_no_writer() {
    let registry = registry();
    let declared = ContentType::new("application/x-www-form-urlencoded").unwrap();

    let err = registry
        .write(&Outbound::value(&1u8), Some(&declared))
        .unwrap_err();

    assert!(err.is_unresolved());
    assert!(err.to_string().contains("application/x-www-form-urlencoded"));
}

#[test]
fn malformed_json_response_is_codec_error() {
    let registry = registry();
    let payload = Payload::new(b"{\"title\":".to_vec(), Some(ContentType::json()));

    let err = registry.decode::<Embed>(&payload).unwrap_err();

    assert!(matches!(
        err,
        exchange::ExchangeError::Codec(CodecError::Deserialize { .. })
    ));
}

/// A JSON writer that counts its calls, to be layered ahead of the default one.
#[derive(Debug, Default)]
struct CountingJson(AtomicUsize);

impl WriterStrategy for CountingJson {
    fn name(&self) -> &'static str {
        "counting-json"
    }

    fn can_write(&self, ty: &TypeDescriptor, declared: Option<&ContentType>) -> bool {
        ty.is_structured() && exchange::unset_or_is(declared, ContentType::APPLICATION_JSON)
    }

    fn write(&self, value: &Outbound<'_>) -> Result<Payload, CodecError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let structured = value.to_structured().unwrap_or(Ok(serde_json::Value::Null))?;
        Ok(Payload::new(structured.to_string(), Some(ContentType::json())))
    }
}

#[test]
fn custom_json_writer_registered_first_intercepts_structured_values() {
    let custom = Arc::new(CountingJson::default());
    let mut builder = ExchangeStrategies::empty_builder();
    builder.shared_writer_strategy(custom.clone());
    extend_with_defaults(&mut builder, Arc::new(SerdeJsonMapper::new()));
    let registry = builder.build();

    assert_eq!(
        writer_names(&registry),
        ["counting-json", "multipart", "json", "empty"]
    );

    registry.write(&Outbound::value(&"x"), None).unwrap();
    let form = MultipartForm::new().part(Part::new(
        "file",
        Some("f".to_string()),
        None,
        PartBody::Binary(vec![1]),
    ));
    registry.write(&Outbound::form(&form), None).unwrap();
    registry.write(&Outbound::absent(), None).unwrap();

    assert_eq!(custom.0.load(Ordering::SeqCst), 1);
}
