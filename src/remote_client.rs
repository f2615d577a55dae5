//! Blocking HTTP transport for the arXiv endpoints.
//!
//! Everything above this module sees a response as a status code plus raw bytes, so the
//! harvester and the strategy chain can be driven by an in-memory fake in tests.

use crate::error::Result;
use crate::settings::Settings;

/// Status and raw body of one GET
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can perform a blocking GET
pub trait Fetch {
    /// Transport failures (DNS, timeout, reset) are `Err`; any HTTP status is `Ok`.
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

pub struct RemoteClient {
    client: reqwest::blocking::Client,
}

impl RemoteClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for RemoteClient {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(FetchResponse { status, body })
    }
}
