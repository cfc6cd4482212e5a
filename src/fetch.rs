//! PokeAPI access.
//!
//! The HTTP layer sits behind [`HttpTransport`] so callers can swap the blocking
//! `reqwest` client for a fake in tests.

use log::debug;

use crate::error::FetchError;
use crate::model::EntityRecord;

/// Base URL of the public PokeAPI deployment.
pub const DEFAULT_API_BASE: &str = "https://pokeapi.co";

const USER_AGENT: &str = concat!("pokemon_report/", env!("CARGO_PKG_VERSION"));

/// Status code and body of a completed HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Creates a response from its parts.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Minimal blocking GET capability.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// [`HttpTransport`] backed by `reqwest::blocking`.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport with the crate's user agent.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let transport_error = |source| FetchError::Transport {
            url: url.to_owned(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        Ok(HttpResponse { status, body })
    }
}

/// Capability to look up an entity by name.
pub trait EntitySource {
    /// Returns the record for `name`, or `None` when the API answered with anything
    /// other than `200 OK`.
    fn get_info(&self, name: &str) -> Result<Option<EntityRecord>, FetchError>;
}

/// PokeAPI client for the `/api/v2/pokemon/{name}` endpoint.
pub struct PokemonService<T = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl PokemonService<ReqwestTransport> {
    /// Creates a service talking to the public PokeAPI.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_transport(ReqwestTransport::new()?))
    }
}

impl<T: HttpTransport> PokemonService<T> {
    /// Creates a service using a custom transport and the public base URL.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_API_BASE.to_owned(),
        }
    }

    /// Overrides the API base URL and returns the updated service.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the URL queried for `name`. The name is not validated or encoded.
    pub fn pokemon_url(&self, name: &str) -> String {
        format!(
            "{}/api/v2/pokemon/{}",
            self.base_url.trim_end_matches('/'),
            name
        )
    }
}

impl<T: HttpTransport> EntitySource for PokemonService<T> {
    fn get_info(&self, name: &str) -> Result<Option<EntityRecord>, FetchError> {
        let url = self.pokemon_url(name);
        debug!("GET {}", url);

        let response = self.transport.get(&url)?;
        if response.status != 200 {
            debug!("{} answered with status {}", url, response.status);
            return Ok(None);
        }

        let record = serde_json::from_str(&response.body)?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::model::AbilitySlot;
    use crate::test_support::CannedServer;

    struct FakeTransport {
        response: HttpResponse,
        requested: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: HttpResponse::new(status, body),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpTransport for FakeTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.requested.borrow_mut().push(url.to_owned());
            Ok(self.response.clone())
        }
    }

    const PIKACHU: &str = r#"{
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "abilities": [{"ability": {"name": "static"}}, {"ability": {"name": "lightning rod"}}]
    }"#;

    #[test]
    fn returns_parsed_record_on_success() {
        let service = PokemonService::with_transport(FakeTransport::new(200, PIKACHU));

        let record = service
            .get_info("pikachu")
            .expect("fetch succeeds")
            .expect("record present");

        assert_eq!(record.name, "pikachu");
        assert_eq!(record.height, 4);
        assert_eq!(record.weight, 60);
        assert_eq!(
            record.abilities,
            vec![AbilitySlot::new("static"), AbilitySlot::new("lightning rod")]
        );
        assert_eq!(
            *service.transport.requested.borrow(),
            ["https://pokeapi.co/api/v2/pokemon/pikachu"]
        );
    }

    #[test]
    fn returns_none_for_non_success_status() {
        let service = PokemonService::with_transport(FakeTransport::new(404, PIKACHU));

        let result = service.get_info("pikachu").expect("fetch succeeds");

        assert!(result.is_none());
        assert_eq!(
            *service.transport.requested.borrow(),
            ["https://pokeapi.co/api/v2/pokemon/pikachu"]
        );
    }

    #[test]
    fn name_only_success_body_is_returned_as_parsed() {
        let service =
            PokemonService::with_transport(FakeTransport::new(200, r#"{"name": "pikachu"}"#));

        let record = service
            .get_info("pikachu")
            .expect("fetch succeeds")
            .expect("record present");

        assert_eq!(record.name, "pikachu");
        assert_eq!(record.height, 0);
        assert!(record.abilities.is_empty());
        assert_eq!(
            *service.transport.requested.borrow(),
            ["https://pokeapi.co/api/v2/pokemon/pikachu"]
        );
    }

    #[test]
    fn server_errors_collapse_to_none() {
        let service = PokemonService::with_transport(FakeTransport::new(500, "{}"));
        assert!(service.get_info("pikachu").expect("fetch succeeds").is_none());
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let service = PokemonService::with_transport(FakeTransport::new(200, "not json"));
        let err = service.get_info("pikachu").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn name_is_forwarded_verbatim() {
        let service = PokemonService::with_transport(FakeTransport::new(404, ""))
            .with_base_url("http://localhost:8080/");

        service.get_info("Mr. Mime").expect("fetch succeeds");

        assert_eq!(
            *service.transport.requested.borrow(),
            ["http://localhost:8080/api/v2/pokemon/Mr. Mime"]
        );
    }

    fn direct_transport() -> ReqwestTransport {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .expect("client builds");
        ReqwestTransport { client }
    }

    #[test]
    fn reqwest_transport_reports_real_status_and_body() {
        let server = CannedServer::start("404 Not Found", "Not Found");
        let url = format!("{}/api/v2/pokemon/missingno", server.base_url());

        let response = direct_transport().get(&url).expect("request completes");

        assert_eq!(response, HttpResponse::new(404, "Not Found"));
        assert!(server
            .request()
            .starts_with("GET /api/v2/pokemon/missingno HTTP/1.1\r\n"));
    }

    #[test]
    fn not_found_over_http_yields_none() {
        let server = CannedServer::start("404 Not Found", "Not Found");
        let service =
            PokemonService::with_transport(direct_transport()).with_base_url(server.base_url());

        let result = service.get_info("pikachu").expect("fetch succeeds");

        assert!(result.is_none());
        let request = server.request();
        assert!(request.starts_with("GET /api/v2/pokemon/pikachu HTTP/1.1\r\n"));
        assert!(request
            .to_ascii_lowercase()
            .contains(&format!("user-agent: {}", USER_AGENT.to_ascii_lowercase())));
    }

    #[test]
    fn success_over_http_parses_the_body() {
        let server = CannedServer::start("200 OK", r#"{"name": "pikachu"}"#);
        let service =
            PokemonService::with_transport(direct_transport()).with_base_url(server.base_url());

        let record = service
            .get_info("pikachu")
            .expect("fetch succeeds")
            .expect("record present");

        assert_eq!(record.name, "pikachu");
        server.request();
    }
}
