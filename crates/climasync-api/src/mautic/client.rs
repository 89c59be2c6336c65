// Mautic REST API HTTP client
//
// Wraps `reqwest::Client` with basic-auth, `/api/` URL construction and
// Mautic's error envelope. Resource-level calls live in `endpoints.rs`.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::types::{Endpoint, ErrorEnvelope, RecordSet};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Async client for a Mautic instance.
///
/// Every request carries HTTP basic auth. List calls return the flattened
/// records of the resource's collection envelope; create/edit calls return
/// the single-item envelope's record.
pub struct MauticClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl MauticClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, basic-auth credentials, and transport config.
    ///
    /// `base_url` is the Mautic root (e.g. `http://localhost:8080`); the
    /// `/api/` prefix is appended per request.
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
        })
    }

    /// Ensure the base URL ends with `/api/` so relative joins land under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The API root (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.authed(self.http.get(url)).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_no_response(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authed(self.http.get(url)).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authed(self.http.post(url)).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_body(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authed(self.http.post(url)).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.authed(self.http.patch(url)).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: format!("Mautic rejected credentials for user '{}'", self.username),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorEnvelope>(&raw)
            .ok()
            .and_then(|env| env.errors.into_iter().find_map(|e| e.message))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Generic resource calls ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /api/{resource}` with query params, flattened to records.
    pub async fn list(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<Vec<Value>, Error> {
        let mut body: serde_json::Map<String, Value> = self.get(endpoint.path, params).await?;
        let records = match body.remove(endpoint.collection) {
            Some(raw) => serde_json::from_value::<RecordSet>(raw.clone()).map_err(|e| {
                Error::Deserialization {
                    message: format!("unexpected '{}' collection: {e}", endpoint.collection),
                    body: raw.to_string(),
                }
            })?,
            None => RecordSet::default(),
        };
        debug!(
            resource = endpoint.path,
            count = records.len(),
            "listed records"
        );
        Ok(records.into_records())
    }

    /// Walk every page of a listing using `start`/`limit`.
    ///
    /// Stops on the first page shorter than `page_size`. Mautic caps list
    /// calls at 30 rows unless `limit` is given, so whole-table reads go
    /// through here.
    pub async fn list_all(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
        page_size: usize,
    ) -> Result<Vec<Value>, Error> {
        let page_size = page_size.max(1);
        let mut all = Vec::new();
        loop {
            let mut paged = params.to_vec();
            paged.push(("start", all.len().to_string()));
            paged.push(("limit", page_size.to_string()));

            let page = self.list(endpoint, &paged).await?;
            let short = page.len() < page_size;
            all.extend(page);
            if short {
                break;
            }
        }
        Ok(all)
    }

    /// `POST /api/{resource}/new`, returning the created record.
    pub async fn create<B: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Value, Error> {
        let path = format!("{}/new", endpoint.path);
        let resp: Value = self.post(&path, body).await?;
        Ok(take_item(resp, endpoint))
    }

    /// `PATCH /api/{resource}/{id}/edit`, returning the updated record.
    pub async fn edit<B: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        id: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let path = format!("{}/{id}/edit", endpoint.path);
        let resp: Value = self.patch(&path, body).await?;
        Ok(take_item(resp, endpoint))
    }
}

/// Unwrap the single-item envelope, falling back to the whole body.
fn take_item(mut resp: Value, endpoint: Endpoint) -> Value {
    match resp.get_mut(endpoint.item) {
        Some(item) => item.take(),
        None => resp,
    }
}

/// Query params for Mautic's `where` filter: `column == value`.
pub fn where_eq(column: &str, value: &str) -> Vec<(&'static str, String)> {
    vec![
        ("where[0][col]", column.to_owned()),
        ("where[0][expr]", "eq".to_owned()),
        ("where[0][val]", value.to_owned()),
    ]
}

/// Query params for Mautic's free-text `search` (supports `field:value`).
pub fn search(expr: &str) -> Vec<(&'static str, String)> {
    vec![("search", expr.to_owned())]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> MauticClient {
        MauticClient::with_client(
            reqwest::Client::new(),
            base,
            "mautic",
            SecretString::from("secret".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn base_url_gains_api_prefix() {
        let c = client("http://localhost:8080");
        assert_eq!(c.base_url().as_str(), "http://localhost:8080/api/");
    }

    #[test]
    fn base_url_keeps_existing_api_prefix() {
        let c = client("http://host/mautic/api/");
        assert_eq!(c.base_url().as_str(), "http://host/mautic/api/");
    }

    #[test]
    fn relative_paths_join_under_api() {
        let c = client("http://host/mautic");
        assert_eq!(
            c.url("contacts/12/edit").unwrap().as_str(),
            "http://host/mautic/api/contacts/12/edit"
        );
    }

    #[test]
    fn where_eq_builds_filter_triplet() {
        let params = where_eq("email", "a@x.com");
        assert_eq!(params[0], ("where[0][col]", "email".to_string()));
        assert_eq!(params[1], ("where[0][expr]", "eq".to_string()));
        assert_eq!(params[2], ("where[0][val]", "a@x.com".to_string()));
    }
}
