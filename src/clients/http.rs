use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use tracing::{debug, error};

use crate::config::ScraperConfig;
use crate::error::{Error, Result};

pub struct HttpClient {
    client: Client,
    headers: HeaderMap,
}

impl HttpClient {
    pub fn new(settings: &ScraperConfig, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        for (key, value) in settings.headers.iter() {
            if let (Ok(header_name), Ok(header_value)) = (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(header_name, header_value);
            } else {
                error!(
                    header_key = key,
                    header_value = value,
                    "Invalid header, skipping"
                );
            }
        }

        debug!(user_agent = user_agent, "Creating client");

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client, headers })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url);
        for (key, value) in self.headers.iter() {
            request = request.header(key, value);
        }
        request
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;

        debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            "Response received"
        );

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimit),
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            _ => Ok(response),
        }
    }

    /// GETs `url` and returns the body of a successful response as text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.send(self.get(url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.text().await?)
    }
}
