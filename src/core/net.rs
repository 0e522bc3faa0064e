// src/core/net.rs
// Blocking HTTPS GET with a fixed deadline and browser-like headers.

use std::io::Read;
use std::time::Duration;

use crate::config::consts::{BROWSER_HEADERS, MAX_IMAGE_BYTES};
use crate::error::{Error, Result};

/// Where pages and images come from. `HttpSource` in production, fixtures in tests.
pub trait PageSource {
    fn get(&mut self, url: &str) -> Result<String>;

    /// Raw body, for images.
    fn get_bytes(&mut self, url: &str) -> Result<Vec<u8>> {
        self.get(url).map(String::into_bytes)
    }
}

pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .build();
        Self { agent }
    }
}

impl PageSource for HttpSource {
    fn get(&mut self, url: &str) -> Result<String> {
        http_get(&self.agent, url)
    }

    fn get_bytes(&mut self, url: &str) -> Result<Vec<u8>> {
        let resp = send(&self.agent, url)?;
        let mut body = Vec::new();
        resp.into_reader()
            .take(MAX_IMAGE_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| Error::Http { url: s!(url), reason: format!("reading body: {e}") })?;
        if body.len() as u64 > MAX_IMAGE_BYTES {
            return Err(Error::Http { url: s!(url), reason: format!("body larger than {MAX_IMAGE_BYTES} bytes") });
        }
        Ok(body)
    }
}

pub fn http_get(agent: &ureq::Agent, url: &str) -> Result<String> {
    send(agent, url)?
        .into_string()
        .map_err(|e| Error::Http { url: s!(url), reason: format!("reading body: {e}") })
}

fn send(agent: &ureq::Agent, url: &str) -> Result<ureq::Response> {
    let mut req = agent.get(url);
    for (name, value) in BROWSER_HEADERS {
        req = req.set(name, value);
    }

    let resp = match req.call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, resp)) => {
            return Err(Error::Http {
                url: s!(url),
                reason: format!("HTTP {} {}", code, resp.status_text()),
            });
        }
        Err(e) => return Err(Error::Http { url: s!(url), reason: e.to_string() }),
    };

    logd!("GET {} -> {}", url, resp.status());
    Ok(resp)
}
