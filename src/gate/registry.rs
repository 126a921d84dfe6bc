//! Registry scope lookup over GraphQL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::scope::ScopeRef;

/// Public registry GraphQL endpoint.
pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.v2.bit.cloud/graphql";

const SCOPE_QUERY: &str = "query GET_SCOPE($scopeId: String!) {\n  getScope(id: $scopeId) {\n    id\n  }\n}";

/// Failures talking to the registry. The gate collapses all of them into a
/// single unavailable-scope error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The endpoint URL could not be parsed.
    #[error("registry endpoint is invalid: {0}")]
    InvalidEndpoint(String),

    /// The request did not complete.
    #[error("registry request failed: {message}")]
    Transport {
        /// Transport error detail.
        message: String,
    },

    /// The registry answered with a non-success status.
    #[error("registry returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The body was not a GraphQL response.
    #[error("registry response was not understood: {message}")]
    InvalidResponse {
        /// Decoding error detail.
        message: String,
    },
}

/// Read-only registry queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Resolves the registry id of `scope`, `None` when the registry returns
    /// no scope.
    async fn scope_id(&self, scope: &ScopeRef) -> Result<Option<String>, RegistryError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeVariables<'a> {
    scope_id: &'a str,
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: ScopeVariables<'a>,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<ScopeData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScopeData {
    get_scope: Option<ScopeNode>,
}

#[derive(Deserialize)]
struct ScopeNode {
    id: Option<String>,
}

/// [`RegistryClient`] issuing bearer-authenticated GraphQL requests.
#[derive(Debug, Clone)]
pub struct GraphqlRegistryClient {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl GraphqlRegistryClient {
    /// Creates a client for `endpoint` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidEndpoint`] for an unparsable URL and
    /// [`RegistryError::Transport`] when the HTTP client cannot be built.
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self, RegistryError> {
        let endpoint =
            Url::parse(endpoint).map_err(|error| RegistryError::InvalidEndpoint(error.to_string()))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("lanesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| RegistryError::Transport {
                message: error.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }
}

#[async_trait]
impl RegistryClient for GraphqlRegistryClient {
    async fn scope_id(&self, scope: &ScopeRef) -> Result<Option<String>, RegistryError> {
        let scope_id = scope.qualified();
        let request = GraphqlRequest {
            query: SCOPE_QUERY,
            variables: ScopeVariables {
                scope_id: scope_id.as_str(),
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|error| RegistryError::Transport {
                message: error.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
            });
        }

        let body: GraphqlResponse =
            response
                .json()
                .await
                .map_err(|error| RegistryError::InvalidResponse {
                    message: error.to_string(),
                })?;

        Ok(body
            .data
            .and_then(|data| data.get_scope)
            .and_then(|node| node.id))
    }
}

#[cfg(test)]
mod tests {
    type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{GraphqlRegistryClient, RegistryClient, RegistryError, SCOPE_QUERY};
    use crate::scope::ScopeRef;

    fn client_for(server: &MockServer) -> FixtureResult<GraphqlRegistryClient> {
        Ok(GraphqlRegistryClient::new(
            &format!("{}/graphql", server.uri()),
            "bit-token",
        )?)
    }

    fn scope() -> ScopeRef {
        ScopeRef::new("acme", "design").expect("valid scope")
    }

    #[rstest]
    #[tokio::test]
    async fn resolves_scope_ids_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer bit-token"))
            .and(body_json(json!({
                "query": SCOPE_QUERY,
                "variables": { "scopeId": "acme.design" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "getScope": { "id": "acme.design" } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).expect("client should build");
        let id = client.scope_id(&scope()).await.expect("query should succeed");

        assert_eq!(id.as_deref(), Some("acme.design"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_scope_yields_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "getScope": null },
                "errors": [{ "message": "scope not found" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).expect("client should build");
        let id = client.scope_id(&scope()).await.expect("query should succeed");

        assert!(id.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn unauthorised_responses_surface_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).expect("client should build");
        let error = client
            .scope_id(&scope())
            .await
            .expect_err("query should fail");

        assert_eq!(error, RegistryError::Status { status: 401 });
    }

    #[rstest]
    fn rejects_invalid_endpoints() {
        let result = GraphqlRegistryClient::new("not a url", "token");
        assert!(matches!(result, Err(RegistryError::InvalidEndpoint(_))));
    }
}
