use crate::config::ContentfulConfig;
use crate::core::query::EntryQuery;
use crate::domain::model::{Asset, Entry, EntryCollection, Environment, Snapshot};
use crate::domain::ports::CmsClient;
use crate::utils::error::{CmsError, RepositoryError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";
const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

#[derive(Debug, Deserialize)]
struct CollectionResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(rename = "Entry", default)]
    entries: Vec<Entry>,
    #[serde(rename = "Asset", default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    sys: ErrorSys,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorSys {
    id: String,
}

/// HTTP client for the Contentful delivery, preview and management APIs.
#[derive(Debug, Clone)]
pub struct ContentfulClient {
    http: Client,
    config: ContentfulConfig,
}

impl ContentfulClient {
    pub fn new(config: ContentfulConfig) -> crate::utils::error::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("content-repo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Config {
                missing: Vec::new(),
                invalid: vec![format!("http client: {}", e)],
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ContentfulConfig {
        &self.config
    }

    fn space_url(&self, base: &str, segments: &[&str]) -> Result<Url, CmsError> {
        let mut url = Url::parse(base)
            .map_err(|e| CmsError::Unexpected(format!("invalid base URL {}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| CmsError::Unexpected(format!("base URL {} cannot have a path", base)))?
            .pop_if_empty()
            .extend(["spaces", self.config.space_id.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn environment_url(&self, base: &str, segments: &[&str]) -> Result<Url, CmsError> {
        let mut scoped = vec!["environments", self.config.environment.as_str()];
        scoped.extend_from_slice(segments);
        self.space_url(base, &scoped)
    }

    fn management(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.management_api_key)
            .header(reqwest::header::CONTENT_TYPE, MANAGEMENT_CONTENT_TYPE)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CmsError> {
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CmsError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("CMS response status: {}", status);

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error) => CmsError::Api {
                    status: status.as_u16(),
                    error_id: error.sys.id,
                    message: error.message.unwrap_or_default(),
                    request_id: error.request_id,
                },
                Err(_) => CmsError::Api {
                    status: status.as_u16(),
                    error_id: status.canonical_reason().unwrap_or("Unknown").to_string(),
                    message: body,
                    request_id: None,
                },
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CmsClient for ContentfulClient {
    async fn search_entries(
        &self,
        query: &EntryQuery,
        use_preview: bool,
    ) -> Result<EntryCollection, CmsError> {
        let (base, key) = if use_preview {
            (&self.config.preview_url, &self.config.preview_api_key)
        } else {
            (&self.config.delivery_url, &self.config.delivery_api_key)
        };
        let url = self.environment_url(base, &["entries"])?;
        tracing::debug!("Making CMS search request to: {}{}", url, query.build());

        let request = self.http.get(url).bearer_auth(key).query(&query.to_params());
        let response: CollectionResponse<Entry> = Self::send(request).await?;

        Ok(EntryCollection {
            items: response.items,
            included_entries: response.includes.entries,
            included_assets: response.includes.assets,
        })
    }

    async fn get_management_entry(&self, id: &str) -> Result<Entry, CmsError> {
        let url = self.environment_url(&self.config.management_url, &["entries", id])?;
        Self::send(self.management(self.http.get(url))).await
    }

    async fn create_or_update_entry(
        &self,
        entry: &Entry,
        expected_version: Option<u32>,
    ) -> Result<Entry, CmsError> {
        let url = self.environment_url(&self.config.management_url, &["entries", entry.id()])?;
        let mut request = self
            .management(self.http.put(url))
            .json(&serde_json::json!({ "fields": entry.fields }));
        if let Some(version) = expected_version {
            request = request.header(VERSION_HEADER, version);
        }
        if let Some(content_type) = entry.content_type() {
            request = request.header(CONTENT_TYPE_HEADER, content_type);
        }
        Self::send(request).await
    }

    async fn publish_entry(&self, id: &str, version: u32) -> Result<Entry, CmsError> {
        let url =
            self.environment_url(&self.config.management_url, &["entries", id, "published"])?;
        let request = self
            .management(self.http.put(url))
            .header(VERSION_HEADER, version);
        Self::send(request).await
    }

    async fn get_snapshots_for_entry(&self, id: &str) -> Result<Vec<Snapshot>, CmsError> {
        let url =
            self.environment_url(&self.config.management_url, &["entries", id, "snapshots"])?;
        let response: CollectionResponse<Snapshot> =
            Self::send(self.management(self.http.get(url))).await?;
        Ok(response.items)
    }

    async fn create_or_update_environment(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Environment, CmsError> {
        let body = serde_json::json!({ "name": name });
        // Without an id the CMS assigns one.
        let request = if id.trim().is_empty() {
            let url = self.space_url(&self.config.management_url, &["environments"])?;
            self.http.post(url)
        } else {
            let url = self.space_url(&self.config.management_url, &["environments", id])?;
            self.http.put(url)
        };
        Self::send(self.management(request).json(&body)).await
    }
}
