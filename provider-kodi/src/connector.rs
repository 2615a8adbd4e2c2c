//! Kodi JSON-RPC connector implementation
//!
//! Implements the `MediaSource` trait over the `HttpClient` bridge.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_library::error::{LibraryError, Result as LibraryResult};
use core_library::models::{Episode, MediaKind, Movie, WatchUpdate};
use core_library::source::MediaSource;
use core_runtime::config::LibraryEndpoint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{KodiError, Result};
use crate::types::{
    EpisodesResult, JsonRpcRequest, JsonRpcResponse, ListParams, MoviesResult, ResumeParam,
    SetDetailsParams, EPISODES_REQUEST_ID, GET_EPISODES, GET_MOVIES, MOVIES_REQUEST_ID,
    SET_EPISODE_DETAILS, SET_MOVIE_DETAILS,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Kodi JSON-RPC connector
///
/// One connector talks to one Kodi instance. Every call is a single HTTP
/// request with Basic authentication and a bounded timeout; nothing is
/// retried.
///
/// # Example
///
/// ```ignore
/// use provider_kodi::KodiConnector;
/// use core_library::MediaSource;
///
/// let connector = KodiConnector::new("Living room", "http://192.168.1.10:8080/jsonrpc", http_client)
///     .with_credentials("kodi", "kodi");
/// let movies = connector.fetch_movies().await?;
/// ```
pub struct KodiConnector {
    name: String,
    api_url: String,
    username: String,
    password: String,
    timeout: Duration,
    http_client: Arc<dyn HttpClient>,
}

impl KodiConnector {
    pub fn new(
        name: impl Into<String>,
        api_url: impl Into<String>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.into(),
            username: String::new(),
            password: String::new(),
            timeout: DEFAULT_TIMEOUT,
            http_client,
        }
    }

    /// Build a connector from a configured library endpoint
    pub fn from_endpoint(endpoint: &LibraryEndpoint, http_client: Arc<dyn HttpClient>) -> Self {
        Self::new(&endpoint.name, &endpoint.api_url, http_client)
            .with_credentials(&endpoint.username, &endpoint.password)
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// POST one JSON-RPC request and decode the envelope
    #[instrument(skip(self, request), fields(library = %self.name, method = request.method))]
    async fn call<P, R>(&self, request: &JsonRpcRequest<P>) -> Result<JsonRpcResponse<R>>
    where
        P: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let http_request = HttpRequest::new(HttpMethod::Post, &self.api_url)
            .header("Accept", "application/json")
            .basic_auth(&self.username, &self.password)
            .timeout(self.timeout)
            .json(request)?;

        let response = self.http_client.execute(http_request).await?;
        Self::check_status(&response)?;

        let envelope: JsonRpcResponse<R> = serde_json::from_slice(&response.body)
            .map_err(|e| KodiError::ParseError(e.to_string()))?;

        if let Some(error) = envelope.error {
            warn!(code = error.code, message = %error.message, "Kodi returned an error");
            return Err(KodiError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        debug!("JSON-RPC call succeeded");
        Ok(envelope)
    }

    fn check_status(response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        warn!(status = response.status, "Kodi request failed");
        Err(KodiError::HttpStatus {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).to_string(),
        })
    }

    async fn list<R>(&self, method: &'static str, params: ListParams, id: &'static str) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let request = JsonRpcRequest::new(method, params, id);
        let envelope: JsonRpcResponse<R> = self.call(&request).await?;
        envelope
            .result
            .ok_or_else(|| KodiError::EmptyResult(method.to_string()))
    }

    fn details_request(update: &WatchUpdate) -> JsonRpcRequest<SetDetailsParams> {
        let mut params = SetDetailsParams {
            playcount: update.play_count,
            resume: update
                .resume_position
                .map(|position| ResumeParam { position }),
            ..Default::default()
        };

        match update.kind {
            MediaKind::Movie => {
                params.movieid = Some(update.library_id);
                JsonRpcRequest::new(SET_MOVIE_DETAILS, params, MOVIES_REQUEST_ID)
            }
            MediaKind::Episode => {
                params.episodeid = Some(update.library_id);
                JsonRpcRequest::new(SET_EPISODE_DETAILS, params, EPISODES_REQUEST_ID)
            }
        }
    }

    async fn set_details(&self, update: &WatchUpdate) -> Result<()> {
        let request = Self::details_request(update);
        let envelope: JsonRpcResponse<Value> = self.call(&request).await?;

        match envelope.result {
            Some(Value::String(ref ack)) if ack == "OK" => Ok(()),
            Some(other) => Err(KodiError::Rejected(other.to_string())),
            None => Err(KodiError::EmptyResult(request.method.to_string())),
        }
    }
}

#[async_trait]
impl MediaSource for KodiConnector {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(library = %self.name))]
    async fn check_alive(&self) -> bool {
        let request = HttpRequest::new(HttpMethod::Head, &self.api_url)
            .basic_auth(&self.username, &self.password)
            .timeout(self.timeout);

        match self.http_client.execute(request).await {
            Ok(response) if !response.is_server_error() => {
                debug!(status = response.status, "Kodi endpoint is alive");
                true
            }
            Ok(response) => {
                warn!(status = response.status, "Kodi endpoint answered with a server error");
                false
            }
            Err(e) => {
                warn!(error = %e, "Kodi endpoint is not responding");
                false
            }
        }
    }

    #[instrument(skip(self), fields(library = %self.name))]
    async fn fetch_movies(&self) -> LibraryResult<Vec<Movie>> {
        let result: MoviesResult = self
            .list(GET_MOVIES, ListParams::movies(), MOVIES_REQUEST_ID)
            .await
            .map_err(|e| e.into_fetch_error(&self.name))?;

        let movies: Vec<Movie> = result.movies.into_iter().map(Movie::from).collect();
        info!(count = movies.len(), "Fetched movies");
        Ok(movies)
    }

    #[instrument(skip(self), fields(library = %self.name))]
    async fn fetch_episodes(&self) -> LibraryResult<Vec<Episode>> {
        let result: EpisodesResult = self
            .list(GET_EPISODES, ListParams::episodes(), EPISODES_REQUEST_ID)
            .await
            .map_err(|e| e.into_fetch_error(&self.name))?;

        let episodes: Vec<Episode> = result.episodes.into_iter().map(Episode::from).collect();
        info!(count = episodes.len(), "Fetched episodes");
        Ok(episodes)
    }

    #[instrument(skip(self, update), fields(library = %self.name, kind = %update.kind, id = update.library_id))]
    async fn push_update(&self, update: &WatchUpdate) -> LibraryResult<()> {
        if update.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "update".to_string(),
                message: "no watch-state field to update".to_string(),
            });
        }

        self.set_details(update).await.map_err(|e| {
            e.into_update_error(&self.name, update.kind.as_str(), update.library_id)
        })?;

        debug!(
            play_count = ?update.play_count,
            resume_position = ?update.resume_position,
            "Pushed watch-state update"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn respond(status: u16, body: Value) -> bridge_traits::error::Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn body_of(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_ref().unwrap()).unwrap()
    }

    fn connector(mock_http: MockHttpClient) -> KodiConnector {
        KodiConnector::new("Den", "http://10.0.0.2:8080/jsonrpc", Arc::new(mock_http))
            .with_credentials("kodi", "secret")
    }

    #[tokio::test]
    async fn test_fetch_movies_success() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                let body = body_of(req);
                req.method == HttpMethod::Post
                    && req.url == "http://10.0.0.2:8080/jsonrpc"
                    && req.headers.get("Authorization").map(String::as_str)
                        == Some("Basic a29kaTpzZWNyZXQ=")
                    && req.timeout == Some(Duration::from_secs(5))
                    && body["method"] == "VideoLibrary.GetMovies"
                    && body["id"] == "libMovies"
            })
            .returning(|_| {
                respond(
                    200,
                    json!({
                        "id": "libMovies",
                        "jsonrpc": "2.0",
                        "result": {
                            "movies": [
                                {
                                    "movieid": 1,
                                    "label": "Dune",
                                    "year": 2021,
                                    "imdbnumber": "tt1160419",
                                    "playcount": 0,
                                    "resume": { "position": 0.0, "total": 9300.0 }
                                }
                            ]
                        }
                    }),
                )
            });

        let movies = connector(mock_http).fetch_movies().await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].library_id, 1);
        assert_eq!(movies[0].year, "2021");
        assert_eq!(movies[0].external_number, "tt1160419");
    }

    #[tokio::test]
    async fn test_fetch_episodes_empty_library() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|_| {
            respond(
                200,
                json!({ "id": "libEpisodes", "jsonrpc": "2.0", "result": { "limits": { "total": 0 } } }),
            )
        });

        let episodes = connector(mock_http).fetch_episodes().await.unwrap();
        assert!(episodes.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_null_result_is_no_data() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .returning(|_| respond(200, json!({ "id": "libMovies", "jsonrpc": "2.0", "result": null })));

        let err = connector(mock_http).fetch_movies().await.unwrap_err();
        assert!(matches!(err, LibraryError::NoData { .. }));
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_is_unreachable() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .returning(|_| respond(401, json!("Unauthorized")));

        let err = connector(mock_http).fetch_episodes().await.unwrap_err();
        assert!(matches!(err, LibraryError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_no_data() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: Bytes::from_static(b"<html>not json</html>"),
            })
        });

        let err = connector(mock_http).fetch_movies().await.unwrap_err();
        assert!(matches!(err, LibraryError::NoData { .. }));
    }

    #[tokio::test]
    async fn test_push_update_play_count_only() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                body_of(req)
                    == json!({
                        "jsonrpc": "2.0",
                        "method": "VideoLibrary.SetMovieDetails",
                        "params": { "movieid": 42, "playcount": 1 },
                        "id": "libMovies"
                    })
            })
            .returning(|_| respond(200, json!({ "id": "libMovies", "jsonrpc": "2.0", "result": "OK" })));

        let update = WatchUpdate {
            kind: MediaKind::Movie,
            library_id: 42,
            play_count: Some(1),
            resume_position: None,
        };

        connector(mock_http).push_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn test_push_update_episode_both_fields() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .times(1)
            .withf(|req| {
                body_of(req)["params"]
                    == json!({ "episodeid": 7, "playcount": 2, "resume": { "position": 1200 } })
            })
            .returning(|_| respond(200, json!({ "id": "libEpisodes", "jsonrpc": "2.0", "result": "OK" })));

        let update = WatchUpdate {
            kind: MediaKind::Episode,
            library_id: 7,
            play_count: Some(2),
            resume_position: Some(1200),
        };

        connector(mock_http).push_update(&update).await.unwrap();
    }

    #[tokio::test]
    async fn test_push_update_rejected() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().returning(|_| {
            respond(
                200,
                json!({
                    "id": "libMovies",
                    "jsonrpc": "2.0",
                    "error": { "code": -32602, "message": "Invalid params." }
                }),
            )
        });

        let update = WatchUpdate {
            kind: MediaKind::Movie,
            library_id: 42,
            play_count: Some(1),
            resume_position: None,
        };

        let err = connector(mock_http).push_update(&update).await.unwrap_err();
        assert!(matches!(err, LibraryError::UpdateRejected { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_push_empty_update_is_not_sent() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let update = WatchUpdate {
            kind: MediaKind::Movie,
            library_id: 42,
            play_count: None,
            resume_position: None,
        };

        let err = connector(mock_http).push_update(&update).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_check_alive() {
        let mut mock_http = MockHttpClient::new();
        let mut statuses = vec![200u16, 405, 503].into_iter();

        mock_http
            .expect_execute()
            .times(3)
            .withf(|req| req.method == HttpMethod::Head && req.body.is_none())
            .returning(move |_| respond(statuses.next().unwrap(), Value::Null));

        let connector = connector(mock_http);
        assert!(connector.check_alive().await);
        assert!(connector.check_alive().await);
        assert!(!connector.check_alive().await);
    }

    #[tokio::test]
    async fn test_check_alive_timeout() {
        let mut mock_http = MockHttpClient::new();

        mock_http
            .expect_execute()
            .returning(|_| Err(BridgeError::Timeout(5000)));

        assert!(!connector(mock_http).check_alive().await);
    }

    #[test]
    fn test_from_endpoint() {
        let endpoint = LibraryEndpoint::new("Den", "10.0.0.2", "http://10.0.0.2:8080/jsonrpc")
            .with_credentials("kodi", "secret");
        let connector = KodiConnector::from_endpoint(&endpoint, Arc::new(MockHttpClient::new()))
            .with_timeout(Duration::from_secs(2));

        assert_eq!(connector.name(), "Den");
        assert_eq!(connector.api_url(), "http://10.0.0.2:8080/jsonrpc");
        assert_eq!(connector.timeout, Duration::from_secs(2));
    }
}
