//! HTTP client for the MediaTailor REST API

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ApiError, ApiErrorKind, ApiResult, Operation};
use super::models::{
    ChannelDescription, ChannelPolicy, ChildReference, CreateChannelRequest,
    PlaybackConfigurationDescription, PlaybackConfigurationRequest, SourceDescription,
    SourceListPage, SourceLocationDescription, SourceLocationRequest, SourceRequest,
    TagResourceRequest, UpdateChannelRequest,
};
use super::{source_operation, MediaTailorApi, SourceVerb};
use crate::crd::SourceKind;
use crate::error::{Error, Result};

/// Page size requested from list operations
const LIST_PAGE_SIZE: &str = "100";

/// Connection settings for [`HttpMediaTailorClient`]
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Base URL of the control plane, e.g. `https://api.mediatailor.eu-west-1.amazonaws.com`
    pub endpoint: String,
    /// Bearer token sent with every request, if any
    pub token: Option<String>,
    pub timeout: Duration,
}

/// [`MediaTailorApi`] over the REST-JSON interface
pub struct HttpMediaTailorClient {
    http_client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpMediaTailorClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            Error::ConfigError(format!(
                "Invalid MediaTailor endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "MediaTailor endpoint '{}' cannot be used as a base URL",
                config.endpoint
            )));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
            token: config.token,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // cannot_be_a_base was rejected in new(), so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send the request and turn any non-2xx response into an [`ApiError`]
    async fn execute(&self, operation: Operation, builder: RequestBuilder) -> ApiResult<Response> {
        let result = self.send(operation, builder).await;

        #[cfg(feature = "metrics")]
        {
            let outcome = match &result {
                Ok(_) => "success".to_string(),
                Err(e) => e.kind.to_string(),
            };
            crate::controller::metrics::inc_remote_call(operation.as_str(), &outcome);
        }

        result
    }

    async fn send(&self, operation: Operation, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await.map_err(|e| {
            ApiError::new(operation, ApiErrorKind::Transport, e.to_string())
        })?;

        let status = response.status();
        debug!("{} returned {}", operation, status);
        if status.is_success() {
            return Ok(response);
        }

        let error_type = response
            .headers()
            .get("x-amzn-ErrorType")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(':').next().unwrap_or(v).to_string());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("Message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or(body);

        let kind = match error_type.as_deref() {
            Some("NotFoundException") => ApiErrorKind::NotFound,
            Some("ConflictException") => ApiErrorKind::Conflict,
            _ => ApiErrorKind::from_status(status.as_u16()),
        };
        let message = match error_type {
            Some(error_type) => format!("{}: {}", error_type, message),
            None => message,
        };

        Err(ApiError::new(operation, kind, message))
    }

    async fn json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.execute(operation, builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::new(operation, ApiErrorKind::Decode, e.to_string()))
    }

    async fn empty(&self, operation: Operation, builder: RequestBuilder) -> ApiResult<()> {
        self.execute(operation, builder).await.map(|_| ())
    }

    fn source_segments(kind: SourceKind) -> (&'static str, &'static str) {
        match kind {
            SourceKind::Vod => ("vodSource", "vodSources"),
            SourceKind::Live => ("liveSource", "liveSources"),
        }
    }
}

#[async_trait]
impl MediaTailorApi for HttpMediaTailorClient {
    async fn create_channel(
        &self,
        request: &CreateChannelRequest,
    ) -> ApiResult<ChannelDescription> {
        let url = self.url(&["channel", &request.channel_name]);
        self.json(
            Operation::CreateChannel,
            self.request(Method::POST, url).json(request),
        )
        .await
    }

    async fn describe_channel(&self, name: &str) -> ApiResult<ChannelDescription> {
        let url = self.url(&["channel", name]);
        self.json(Operation::DescribeChannel, self.request(Method::GET, url))
            .await
    }

    async fn update_channel(
        &self,
        request: &UpdateChannelRequest,
    ) -> ApiResult<ChannelDescription> {
        let url = self.url(&["channel", &request.channel_name]);
        self.json(
            Operation::UpdateChannel,
            self.request(Method::PUT, url).json(request),
        )
        .await
    }

    async fn delete_channel(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["channel", name]);
        self.empty(Operation::DeleteChannel, self.request(Method::DELETE, url))
            .await
    }

    async fn start_channel(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["channel", name, "start"]);
        self.empty(Operation::StartChannel, self.request(Method::PUT, url))
            .await
    }

    async fn stop_channel(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["channel", name, "stop"]);
        self.empty(Operation::StopChannel, self.request(Method::PUT, url))
            .await
    }

    async fn put_channel_policy(&self, name: &str, policy: &str) -> ApiResult<()> {
        let url = self.url(&["channel", name, "policy"]);
        let body = ChannelPolicy {
            policy: policy.to_string(),
        };
        self.empty(
            Operation::PutChannelPolicy,
            self.request(Method::PUT, url).json(&body),
        )
        .await
    }

    async fn get_channel_policy(&self, name: &str) -> ApiResult<String> {
        let url = self.url(&["channel", name, "policy"]);
        let body: ChannelPolicy = self
            .json(Operation::GetChannelPolicy, self.request(Method::GET, url))
            .await?;
        Ok(body.policy)
    }

    async fn delete_channel_policy(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["channel", name, "policy"]);
        self.empty(
            Operation::DeleteChannelPolicy,
            self.request(Method::DELETE, url),
        )
        .await
    }

    async fn tag_resource(&self, arn: &str, tags: &BTreeMap<String, String>) -> ApiResult<()> {
        let url = self.url(&["tags", arn]);
        let body = TagResourceRequest { tags: tags.clone() };
        self.empty(
            Operation::TagResource,
            self.request(Method::POST, url).json(&body),
        )
        .await
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        let mut url = self.url(&["tags", arn]);
        {
            let mut query = url.query_pairs_mut();
            for key in keys {
                query.append_pair("tagKeys", key);
            }
        }
        self.empty(Operation::UntagResource, self.request(Method::DELETE, url))
            .await
    }

    async fn create_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription> {
        let url = self.url(&["sourceLocation", &request.source_location_name]);
        self.json(
            Operation::CreateSourceLocation,
            self.request(Method::POST, url).json(request),
        )
        .await
    }

    async fn describe_source_location(&self, name: &str) -> ApiResult<SourceLocationDescription> {
        let url = self.url(&["sourceLocation", name]);
        self.json(
            Operation::DescribeSourceLocation,
            self.request(Method::GET, url),
        )
        .await
    }

    async fn update_source_location(
        &self,
        request: &SourceLocationRequest,
    ) -> ApiResult<SourceLocationDescription> {
        let url = self.url(&["sourceLocation", &request.source_location_name]);
        self.json(
            Operation::UpdateSourceLocation,
            self.request(Method::PUT, url).json(request),
        )
        .await
    }

    async fn delete_source_location(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["sourceLocation", name]);
        self.empty(
            Operation::DeleteSourceLocation,
            self.request(Method::DELETE, url),
        )
        .await
    }

    async fn create_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription> {
        let (single, _) = Self::source_segments(request.kind);
        let url = self.url(&[
            "sourceLocation",
            &request.source_location_name,
            single,
            &request.name,
        ]);
        self.json(
            source_operation(request.kind, SourceVerb::Create),
            self.request(Method::POST, url).json(request),
        )
        .await
    }

    async fn describe_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<SourceDescription> {
        let (single, _) = Self::source_segments(kind);
        let url = self.url(&["sourceLocation", source_location_name, single, name]);
        self.json(
            source_operation(kind, SourceVerb::Describe),
            self.request(Method::GET, url),
        )
        .await
    }

    async fn update_source(&self, request: &SourceRequest) -> ApiResult<SourceDescription> {
        let (single, _) = Self::source_segments(request.kind);
        let url = self.url(&[
            "sourceLocation",
            &request.source_location_name,
            single,
            &request.name,
        ]);
        self.json(
            source_operation(request.kind, SourceVerb::Update),
            self.request(Method::PUT, url).json(request),
        )
        .await
    }

    async fn delete_source(
        &self,
        kind: SourceKind,
        source_location_name: &str,
        name: &str,
    ) -> ApiResult<()> {
        let (single, _) = Self::source_segments(kind);
        let url = self.url(&["sourceLocation", source_location_name, single, name]);
        self.empty(
            source_operation(kind, SourceVerb::Delete),
            self.request(Method::DELETE, url),
        )
        .await
    }

    async fn list_sources(
        &self,
        kind: SourceKind,
        source_location_name: &str,
    ) -> ApiResult<Vec<ChildReference>> {
        let (_, plural) = Self::source_segments(kind);
        let operation = source_operation(kind, SourceVerb::List);
        let mut children = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut url = self.url(&["sourceLocation", source_location_name, plural]);
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxResults", LIST_PAGE_SIZE);
                if let Some(token) = &next_token {
                    query.append_pair("nextToken", token);
                }
            }

            let page: SourceListPage = self
                .json(operation, self.request(Method::GET, url))
                .await?;
            children.extend(page.items.into_iter().map(|item| ChildReference {
                kind,
                source_location_name: source_location_name.to_string(),
                name: item.name,
            }));

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if next_token.as_deref() == Some(token.as_str()) {
                        warn!("{} returned the same page token twice, stopping", operation);
                        break;
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(children)
    }

    async fn put_playback_configuration(
        &self,
        request: &PlaybackConfigurationRequest,
    ) -> ApiResult<PlaybackConfigurationDescription> {
        let url = self.url(&["playbackConfiguration"]);
        self.json(
            Operation::PutPlaybackConfiguration,
            self.request(Method::PUT, url).json(request),
        )
        .await
    }

    async fn get_playback_configuration(
        &self,
        name: &str,
    ) -> ApiResult<PlaybackConfigurationDescription> {
        let url = self.url(&["playbackConfiguration", name]);
        self.json(
            Operation::GetPlaybackConfiguration,
            self.request(Method::GET, url),
        )
        .await
    }

    async fn delete_playback_configuration(&self, name: &str) -> ApiResult<()> {
        let url = self.url(&["playbackConfiguration", name]);
        self.empty(
            Operation::DeletePlaybackConfiguration,
            self.request(Method::DELETE, url),
        )
        .await
    }
}
