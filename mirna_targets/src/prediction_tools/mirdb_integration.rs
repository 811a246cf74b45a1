// src/prediction_tools/mirdb_integration.rs

use std::fmt;
use std::thread;
use std::time::Duration;

use polars::prelude::DataFrame;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{MirdbError, Result};
use crate::prediction_tools::html_table::{mirdb_table, TableOptions};
use crate::prediction_tools::mirdb_query::{reset_fields, reset_url, retrieve_fields, MirdbQuery};

/// Anything able to POST an urlencoded form and hand back the page body.
pub trait FormTransport {
    fn post_form(&self, url: &str, fields: &[(&'static str, String)]) -> Result<String>;
}

/// Blocking HTTP client with a cookie jar, one per session.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("text/html"));
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| MirdbError::InvalidOption(format!("user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl FormTransport for ReqwestTransport {
    fn post_form(&self, url: &str, fields: &[(&'static str, String)]) -> Result<String> {
        debug!("POST {}", url);
        let response = self.client.post(url).form(fields).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirdbError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub base_url: String,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub reset: bool,
}

impl From<&PipelineConfig> for SessionSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            poll_attempts: config.poll_attempts.max(1),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            reset: config.reset_session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Submit,
    PollFilename,
    Retrieve,
    Reset,
    Done,
}

/// The page miRDB finally answered with.
#[derive(Debug, Clone)]
pub struct MirdbResponse {
    pub html: String,
    /// Result file name, custom predictions only.
    pub file_name: Option<String>,
}

impl MirdbResponse {
    pub fn to_table(&self, options: &TableOptions) -> Result<DataFrame> {
        mirdb_table(&self.html, options)
    }
}

impl fmt::Display for MirdbResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.html)
    }
}

/// Value of the hidden `fileName` input on a custom prediction page.
pub fn find_file_name(html: &str) -> Result<Option<String>> {
    let input = Selector::parse(r#"input[name="fileName"]"#)
        .map_err(|e| MirdbError::Parse(format!("fileName selector: {}", e)))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&input)
        .filter_map(|el| el.value().attr("value"))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string))
}

/// Runs one query against miRDB: submit → poll for file name → retrieve → reset.
pub struct MirdbSession<T: FormTransport> {
    transport: T,
    settings: SessionSettings,
}

impl<T: FormTransport> MirdbSession<T> {
    pub fn new(transport: T, settings: SessionSettings) -> Self {
        Self { transport, settings }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn run(&self, query: &MirdbQuery) -> Result<MirdbResponse> {
        let endpoint = query.endpoint(&self.settings.base_url);
        let mut step = SessionStep::Submit;
        let mut page = String::new();
        let mut file_name: Option<String> = None;
        let mut attempts = 0u32;

        loop {
            debug!("miRDB session step {:?}", step);
            step = match step {
                SessionStep::Submit => {
                    page = self.transport.post_form(&endpoint, &query.submit_fields())?;
                    if query.needs_retrieval() {
                        SessionStep::PollFilename
                    } else {
                        SessionStep::Done
                    }
                }
                SessionStep::PollFilename => {
                    attempts += 1;
                    match find_file_name(&page)? {
                        Some(name) => {
                            info!("miRDB result file {} after {} attempt(s)", name, attempts);
                            file_name = Some(name);
                            SessionStep::Retrieve
                        }
                        None if attempts >= self.settings.poll_attempts => {
                            return Err(MirdbError::PollExhausted { attempts });
                        }
                        None => {
                            debug!("No result file yet, waiting {:?}", self.settings.poll_interval);
                            thread::sleep(self.settings.poll_interval);
                            page = self.transport.post_form(&endpoint, &query.submit_fields())?;
                            SessionStep::PollFilename
                        }
                    }
                }
                SessionStep::Retrieve => {
                    let name = file_name.as_deref().unwrap_or_default();
                    page = self.transport.post_form(&endpoint, &retrieve_fields(name))?;
                    if self.settings.reset {
                        SessionStep::Reset
                    } else {
                        SessionStep::Done
                    }
                }
                SessionStep::Reset => {
                    let url = reset_url(&self.settings.base_url);
                    if let Err(e) = self.transport.post_form(&url, &reset_fields()) {
                        warn!("Could not reset miRDB custom session: {}", e);
                    }
                    SessionStep::Done
                }
                SessionStep::Done => break,
            };
        }

        Ok(MirdbResponse { html: page, file_name })
    }
}
