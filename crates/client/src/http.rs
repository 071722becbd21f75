use std::{fmt, str::FromStr, time::Duration};

use api_types::{
    ListEnvelope, ListParams, Record, Resource,
    card_dispute::{CardDispute, CardDisputeList},
    check_transfer::{CheckTransfer, CheckTransferList},
    transaction::{Transaction, TransactionList},
};
use reqwest::{StatusCode, Url, header};
use serde::Deserialize;

use crate::{
    error::ApiError,
    pagination::{Lister, PageError, Pager},
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("bank_client/", env!("CARGO_PKG_VERSION"));

pub type TransactionsPage = Pager<Client, TransactionList, Transaction>;
pub type CardDisputesPage = Pager<Client, CardDisputeList, CardDispute>;
pub type CheckTransfersPage = Pager<Client, CheckTransferList, CheckTransfer>;

/// Deployment the client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://api.increase.com",
            Self::Sandbox => "https://sandbox.increase.com",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "sandbox" => Ok(Self::Sandbox),
            other => Err(format!(
                "unknown environment `{other}` (expected production or sandbox)"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    detail: Option<String>,
}

/// HTTP executor for the list and retrieve endpoints.
///
/// Cloning is cheap: clones share the connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidBaseUrl(format!("cannot join `{path}`: {err}")))
    }

    async fn get<R: Record>(&self, url: Url, query: &[(String, String)]) -> Result<R, ApiError> {
        let res = self.http.get(url).query(query).send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        if status.is_success() {
            return Ok(api_types::decode(&body)?);
        }

        let (kind, message) = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(err) => {
                let message = err
                    .detail
                    .or(err.title)
                    .unwrap_or_else(|| fallback_message(status));
                (err.kind, message)
            }
            Err(_) => (None, fallback_message(status)),
        };
        tracing::warn!(%status, kind = kind.as_deref(), "request failed: {message}");
        Err(ApiError::Server {
            status,
            kind,
            message,
        })
    }

    /// `GET /<collection>/<id>`.
    pub async fn retrieve<R: Resource>(&self, id: &str) -> Result<R, ApiError> {
        let mut url = self.endpoint(R::LIST_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(format!("{} cannot be a base", self.base_url)))?
            .push(id);
        tracing::debug!(path = R::LIST_PATH, id, "retrieving");
        self.get(url, &[]).await
    }

    /// One page of `GET /<collection>`.
    pub async fn list_page<R: Resource>(
        &self,
        params: &R::ListParams,
    ) -> Result<ListEnvelope<R>, ApiError> {
        let url = self.endpoint(R::LIST_PATH)?;
        let query = params.to_query();
        tracing::debug!(path = R::LIST_PATH, cursor = params.cursor(), "listing");
        self.get(url, query.pairs()).await
    }

    pub async fn list_transactions(
        &self,
        params: TransactionList,
    ) -> Result<TransactionsPage, PageError<ApiError>> {
        Pager::start(self.clone(), params).await
    }

    pub async fn list_card_disputes(
        &self,
        params: CardDisputeList,
    ) -> Result<CardDisputesPage, PageError<ApiError>> {
        Pager::start(self.clone(), params).await
    }

    pub async fn list_check_transfers(
        &self,
        params: CheckTransferList,
    ) -> Result<CheckTransfersPage, PageError<ApiError>> {
        Pager::start(self.clone(), params).await
    }
}

impl<R: Resource> Lister<R::ListParams, R> for Client {
    type Error = ApiError;

    fn list(
        &self,
        params: &R::ListParams,
    ) -> impl std::future::Future<Output = Result<ListEnvelope<R>, ApiError>> + Send {
        self.list_page::<R>(params)
    }
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("server error")
        .to_string()
}

#[derive(Default, Debug)]
pub struct ClientBuilder {
    api_key: Option<String>,
    environment: Environment,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn api_key(mut self, api_key: &str) -> ClientBuilder {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn environment(mut self, environment: Environment) -> ClientBuilder {
        self.environment = environment;
        self
    }

    /// Overrides the environment's base URL.
    pub fn base_url(mut self, base_url: &str) -> ClientBuilder {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ClientBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidApiKey("api key is empty".to_string()))?;

        let raw_url = self
            .base_url
            .unwrap_or_else(|| self.environment.base_url().to_string());
        // `Url::join` drops the last segment unless the base ends with a slash.
        let with_slash = if raw_url.ends_with('/') {
            raw_url
        } else {
            format!("{raw_url}/")
        };
        let base_url =
            Url::parse(&with_slash).map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{base_url} cannot be a base"
            )));
        }

        let mut auth = header::HeaderValue::try_from(format!("Bearer {api_key}"))
            .map_err(|err| ApiError::InvalidApiKey(err.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        tracing::debug!(%base_url, "client ready");
        Ok(Client { base_url, http })
    }
}
