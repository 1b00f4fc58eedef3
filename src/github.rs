use crate::config::GitHubConfig;
use failure::{Error, Fail, ResultExt};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{self, Value};
use std::fmt::{self, Debug, Formatter};

const MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// A thin client for the handful of GitHub endpoints we need.
#[derive(Clone)]
pub struct GitHub {
    cfg: GitHubConfig,
    token: String,
    client: Client,
}

impl GitHub {
    pub fn new<S: Into<String>>(cfg: GitHubConfig, token: S) -> GitHub {
        GitHub {
            cfg,
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Check the token is accepted, returning the login it belongs to.
    pub fn authenticate(&self) -> Result<String, Error> {
        debug!("Checking the API token");

        let endpoint = format!("{}/user", self.api_root());
        let user: AuthenticatedUser = self
            .send_request(&endpoint)
            .context("GitHub rejected the API token")?;

        debug!("Authenticated as {}", user.login);
        Ok(user.login)
    }

    /// Fetch the first page of `username`'s public repositories.
    ///
    /// Only a single page of at most `limit` repositories is requested, there
    /// is no pagination.
    pub fn repositories(&self, username: &str) -> Result<Vec<RawRepo>, Error> {
        debug!("Fetching repositories for {}", username);

        let endpoint = self.repositories_endpoint(username);
        let mut repos: Vec<RawRepo> = self
            .send_request(&endpoint)
            .with_context(|_| format!("Unable to list the repositories for {}", username))?;

        repos.truncate(self.cfg.limit);
        debug!("Found {} repositories", repos.len());

        Ok(repos)
    }

    fn api_root(&self) -> &str {
        self.cfg.api_root.trim_end_matches('/')
    }

    fn repositories_endpoint(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page={}",
            self.api_root(),
            username,
            self.cfg.limit
        )
    }

    fn send_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        debug!("Sending request to {:?}", endpoint);

        let request = self
            .client
            .get(endpoint)
            .header(USER_AGENT, self.cfg.agent.as_str())
            .header(ACCEPT, MEDIA_TYPE)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .build()
            .context("Generated invalid request. This is a bug.")?;

        if log_enabled!(log::Level::Trace) {
            let headers = format!("Request Headers {:#?}", request.headers());
            for line in redact(&headers, &self.token).lines() {
                trace!("{}", line);
            }
        }

        let response = self
            .client
            .execute(request)
            .context("Unable to send request")?;

        let status = response.status();
        debug!("Received response ({})", status);

        if log_enabled!(log::Level::Trace) {
            for line in format!("Response Headers {:#?}", response.headers()).lines() {
                trace!("{}", line);
            }
        }

        if !status.is_success() {
            warn!("Request failed with {}", status);

            return Err(FailedRequest {
                status,
                url: endpoint.to_string(),
            }
            .into());
        }

        let body = response.text().context("Unable to read the response body")?;
        let raw: Value = serde_json::from_str(&body).context("The response wasn't valid JSON")?;

        if log_enabled!(log::Level::Trace) {
            trace!("Body:");
            for line in format!("{:#}", raw).lines() {
                trace!("{}", line);
            }
        }

        let got = serde_json::from_value(raw).context("Unable to deserialize response")?;
        Ok(got)
    }
}

impl Debug for GitHub {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("GitHub")
            .field("api_root", &self.cfg.api_root)
            .field("limit", &self.cfg.limit)
            .finish()
    }
}

fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "XXXXXXXXXX")
    }
}

#[derive(Debug, Clone, PartialEq, Fail)]
#[fail(display = "Request to {} failed with {}", url, status)]
pub struct FailedRequest {
    pub status: StatusCode,
    pub url: String,
}

/// One entry from `GET /users/{username}/repos`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRepo {
    pub name: String,
    pub language: Option<String>,
    /// Size in kilobytes, as reported by GitHub.
    pub size: u64,
    pub clone_url: String,
    pub git_url: String,
    pub ssh_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AuthenticatedUser {
    login: String,
}
