//! The request dispatcher.
//!
//! [`RestClient`] performs one request/response exchange per call. Request
//! bodies are encoded through the client's [`ExchangeStrategies`] before any
//! I/O happens, so a missing codec fails without touching the network.
//! Response bodies are decoded by the same registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use exchange::{
    CodecError, ContentType, Describe, ExchangeError, ExchangeStrategies, MultipartForm, Outbound,
    Payload,
};
use model::{Channel, CreateMessage, Message, MessageResolver, Region, ResolveError, Snowflake};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use crate::errors::{snippet, BODY_SNIPPET_LIMIT};
use crate::{RestConfig, RestError, Route};

// ---------------------------------------------------------------------------
// Request values
// ---------------------------------------------------------------------------

/// A request whose body has been encoded but not yet sent.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    route: Route,
    payload: Payload,
}

impl PreparedRequest {
    /// The route the request will be sent to.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The encoded body and its content type.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name the file is uploaded under.
    pub filename: String,
    /// Defaults to `application/octet-stream` when `None`.
    pub content_type: Option<ContentType>,
    /// File contents.
    pub data: Vec<u8>,
}

impl Attachment {
    /// An attachment with the default content type.
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client that encodes and decodes bodies through an exchange registry.
///
/// Cheap to clone; clones share the connection pool and the registry.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    strategies: ExchangeStrategies,
}

impl RestClient {
    /// Creates a client with an explicit registry.
    ///
    /// # Errors
    ///
    /// [`RestError::InvalidConfig`] or [`RestError::InvalidHeader`] when the
    /// configuration cannot be used; [`RestError::Transport`] when the
    /// underlying HTTP client cannot be built.
    pub fn new(config: RestConfig, strategies: ExchangeStrategies) -> Result<Self, RestError> {
        let base_url = config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bot {token}")).map_err(|source| {
                RestError::InvalidHeader {
                    name: "authorization",
                    source,
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|source| {
            RestError::InvalidHeader {
                name: "user-agent",
                source,
            }
        })?;

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(base_url.as_str().trim_end_matches('/')),
            strategies,
        })
    }

    /// Creates a client using the default codecs and a compact JSON mapper.
    pub fn with_defaults(config: RestConfig) -> Result<Self, RestError> {
        let strategies = codecs::defaults(Arc::new(codecs::SerdeJsonMapper::new()));
        Self::new(config, strategies)
    }

    /// The registry used for request and response bodies.
    pub fn strategies(&self) -> &ExchangeStrategies {
        &self.strategies
    }

    /// Encodes `body` for `route` without performing any I/O.
    ///
    /// `content_type` overrides the content type used for writer selection.
    pub fn prepare(
        &self,
        route: Route,
        body: &Outbound<'_>,
        content_type: Option<&ContentType>,
    ) -> Result<PreparedRequest, RestError> {
        let payload = self.strategies.write(body, content_type)?;
        Ok(PreparedRequest { route, payload })
    }

    /// Sends a prepared request and returns the raw response body.
    ///
    /// Non-2xx statuses become [`RestError::Status`].
    pub async fn send(&self, request: PreparedRequest) -> Result<Payload, RestError> {
        let PreparedRequest { route, payload } = request;
        let url = format!("{}{}", self.base_url, route.path());

        let mut builder = self.http.request(route.method().clone(), url);
        if let Some(content_type) = payload.content_type() {
            let value = HeaderValue::from_str(content_type.as_str()).map_err(|source| {
                RestError::InvalidHeader {
                    name: "content-type",
                    source,
                }
            })?;
            builder = builder.header(CONTENT_TYPE, value);
        }
        if !payload.is_empty() {
            builder = builder.body(payload.body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(ContentType::new);
        let retry_after = retry_after(response.headers());
        let body = response.bytes().await?;

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "Response received"
        );

        if !status.is_success() {
            return Err(RestError::Status {
                route: route.to_string(),
                status,
                retry_after,
                body_snippet: snippet(&String::from_utf8_lossy(&body), BODY_SNIPPET_LIMIT),
            });
        }

        Ok(Payload::new(body.to_vec(), content_type))
    }

    /// Encodes `body`, sends it to `route`, and decodes the response as `T`.
    ///
    /// An empty response body yields `Ok(None)`.
    pub async fn exchange<T>(
        &self,
        route: Route,
        body: &Outbound<'_>,
        content_type: Option<&ContentType>,
    ) -> Result<Option<T>, RestError>
    where
        T: Describe + DeserializeOwned,
    {
        let span = info_span!("rest.exchange", method = %route.method(), path = route.path());
        self.exchange_inner(route, body, content_type)
            .instrument(span)
            .await
    }

    async fn exchange_inner<T>(
        &self,
        route: Route,
        body: &Outbound<'_>,
        content_type: Option<&ContentType>,
    ) -> Result<Option<T>, RestError>
    where
        T: Describe + DeserializeOwned,
    {
        let prepared = self.prepare(route, body, content_type)?;
        let payload = self.send(prepared).await?;
        Ok(self.strategies.decode::<T>(&payload)?)
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// Lists the voice regions available for new calls.
    pub async fn get_voice_regions(&self) -> Result<Vec<Region>, RestError> {
        let regions = self
            .exchange::<Vec<Region>>(Route::voice_regions(), &Outbound::absent(), None)
            .await?;
        Ok(regions.unwrap_or_default())
    }

    /// Fetches a channel by id.
    pub async fn get_channel(&self, channel_id: Snowflake) -> Result<Option<Channel>, RestError> {
        self.exchange(Route::channel(channel_id), &Outbound::absent(), None)
            .await
    }

    /// Deletes a channel, or closes a DM.
    pub async fn delete_channel(&self, channel_id: Snowflake) -> Result<(), RestError> {
        self.exchange::<()>(Route::delete_channel(channel_id), &Outbound::absent(), None)
            .await?;
        Ok(())
    }

    /// Fetches a single message from a channel.
    pub async fn get_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Option<Message>, RestError> {
        self.exchange(
            Route::channel_message(channel_id, message_id),
            &Outbound::absent(),
            None,
        )
        .await
    }

    /// Posts a message.
    ///
    /// Without attachments the message is sent as JSON. With attachments it is
    /// sent as `multipart/form-data`: the message as the `payload_json` part and
    /// each file as `files[n]`.
    pub async fn create_message(
        &self,
        channel_id: Snowflake,
        message: &CreateMessage,
        attachments: &[Attachment],
    ) -> Result<Option<Message>, RestError> {
        let route = Route::create_message(channel_id);
        if attachments.is_empty() {
            return self.exchange(route, &Outbound::value(message), None).await;
        }

        let form = message_form(message, attachments)?;
        self.exchange(route, &Outbound::form(&form), None).await
    }
}

fn message_form(
    message: &CreateMessage,
    attachments: &[Attachment],
) -> Result<MultipartForm, RestError> {
    let payload_json = serde_json::to_value(message).map_err(|source| {
        ExchangeError::from(CodecError::Serialize {
            type_name: CreateMessage::describe().name().to_string(),
            source,
        })
    })?;

    let form = attachments.iter().enumerate().fold(
        MultipartForm::new().json("payload_json", payload_json),
        |form, (index, attachment)| {
            form.file(
                format!("files[{index}]"),
                attachment.filename.clone(),
                attachment.data.clone(),
                attachment.content_type.clone(),
            )
        },
    );
    Ok(form)
}

/// Parses a `Retry-After` header given in (possibly fractional) seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds = headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Message resolution
// ---------------------------------------------------------------------------

#[async_trait]
impl MessageResolver for RestClient {
    async fn message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Message, ResolveError> {
        match self.get_message(channel_id, message_id).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(ResolveError::NotFound {
                channel_id,
                message_id,
            }),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                Err(ResolveError::NotFound {
                    channel_id,
                    message_id,
                })
            }
            Err(err) => Err(ResolveError::Backend(Box::new(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exchange::PartBody;

    #[test]
    fn retry_after_accepts_whole_and_fractional_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(2)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("0.5"));
        assert_eq!(retry_after(&headers), Some(Duration::from_millis(500)));
    }

    #[test]
    fn retry_after_ignores_dates_and_negative_values() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-1"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn message_form_puts_payload_first_then_numbered_files() {
        let form = message_form(
            &CreateMessage::text("see attached"),
            &[
                Attachment::new("a.png", vec![0x89, 0x50]),
                Attachment::new("b.txt", b"hello".to_vec()),
            ],
        )
        .unwrap();

        let names: Vec<&str> = form.parts().iter().map(|part| part.name()).collect();
        assert_eq!(names, ["payload_json", "files[0]", "files[1]"]);
        assert!(matches!(form.parts()[0].body(), PartBody::Json(_)));
        assert_eq!(form.parts()[1].filename(), Some("a.png"));
        assert!(form.has_binary());
    }
}
