// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use beacon_app::{FormSchema, FormValues, ListEndpoint, ListPage, ResourceOption};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRequest {
    pub username: String,
    pub password: String,
    pub token: String,
    pub needs_admin: bool,
    pub update_mapping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallOutcome {
    /// Whether the server reports an admin account. `None` when the response
    /// carried no admin flag.
    pub admin: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn fetch_page(&self, endpoint: &ListEndpoint, page: u32) -> Result<ListPage> {
        let path = endpoint.page_url(page);
        debug!(%path, page, "fetch list page");
        let envelope: ListEnvelope = self.get_json(&path)?;
        Ok(envelope.data)
    }

    pub fn fetch_schema(&self, path: &str) -> Result<FormSchema> {
        let value: Value = self.get_json(path)?;
        let value = match value {
            Value::Object(mut object) if !object.contains_key("groups") => {
                object.remove("data").unwrap_or(Value::Object(object))
            }
            other => other,
        };
        serde_json::from_value(value).with_context(|| format!("decode form schema from {path}"))
    }

    pub fn fetch_values(&self, path: &str) -> Result<FormValues> {
        let value: Value = self.get_json(path)?;
        if !value.is_object() {
            bail!("form values at {path} must be a JSON object");
        }
        Ok(beacon_app::form_values_from_json(&value))
    }

    pub fn submit_values(&self, path: &str, values: &FormValues) -> Result<()> {
        info!(%path, fields = values.len(), "submit form values");
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .json(values)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        check_status(response, &url)?;
        Ok(())
    }

    pub fn list_resources(&self) -> Result<Vec<ResourceOption>> {
        let envelope: ResourceEnvelope = self.get_json("/resources")?;
        Ok(envelope
            .data
            .result
            .into_iter()
            .filter_map(|row| {
                let id = row.get("id")?.as_str()?.to_owned();
                let name = row.get("name")?.as_str()?.to_owned();
                Some(ResourceOption { id, name })
            })
            .collect())
    }

    pub fn install(&self, request: &InstallRequest) -> Result<InstallOutcome> {
        info!(needs_admin = request.needs_admin, "run installer");
        let url = self.url("/install");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = check_status(response, &url)?;
        let body: Value = response.json().context("decode install response")?;
        let admin = body
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("admin"))
            .and_then(Value::as_bool);
        Ok(InstallOutcome { admin })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let response = check_status(response, &url)?;
        response
            .json()
            .with_context(|| format!("decode response from {url}"))
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let error = clean_error_response(status, &body);
    warn!(%url, status = status.as_u16(), "request failed");
    Err(error.context(format!("request {url} failed")))
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [api].base_url and that the API is running ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body) {
        match parsed.detail {
            Some(Detail::Message(message)) if !message.is_empty() => {
                return anyhow!("server error ({}): {}", status.as_u16(), message);
            }
            Some(Detail::Items(items)) if !items.is_empty() => {
                let joined = items
                    .iter()
                    .map(|item| item.msg.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                return anyhow!("server error ({}): {}", status.as_u16(), joined);
            }
            _ => {}
        }
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: ListPage,
}

#[derive(Debug, Deserialize)]
struct ResourceEnvelope {
    data: ResourceRows,
}

#[derive(Debug, Deserialize)]
struct ResourceRows {
    #[serde(default)]
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    detail: Option<Detail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Items(Vec<DetailItem>),
}

#[derive(Debug, Deserialize)]
struct DetailItem {
    msg: String,
}
