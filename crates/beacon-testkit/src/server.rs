// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::debug;

use crate::Fixtures;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: Option<Value>,
}

/// In-process stand-in for the platform API, serving [`Fixtures`] until
/// dropped.
pub struct MockApi {
    base_url: String,
    stop: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockApi {
    pub fn start(fixtures: Fixtures) -> Result<Self> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let stop = Arc::new(AtomicBool::new(false));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let thread_stop = Arc::clone(&stop);
        let thread_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            while !thread_stop.load(Ordering::Relaxed) {
                match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(request)) => handle_request(&fixtures, &thread_requests, request),
                    Ok(None) => {}
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            base_url,
            stop,
            requests,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_request(
    fixtures: &Fixtures,
    requests: &Mutex<Vec<RecordedRequest>>,
    mut request: Request,
) {
    let method = request.method().clone();
    let url = request.url().to_owned();

    let mut raw = String::new();
    let body = match request.as_reader().read_to_string(&mut raw) {
        Ok(_) if !raw.is_empty() => serde_json::from_str(&raw).ok(),
        _ => None,
    };
    debug!(%method, %url, "mock api request");

    let (status, payload) = route(fixtures, &method, &url, body.as_ref());
    requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.to_string(),
            url,
            body,
        });

    let mut response = Response::from_string(payload.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

fn route(fixtures: &Fixtures, method: &Method, url: &str, body: Option<&Value>) -> (u16, Value) {
    if let Some((collection, query, page)) = parse_page_url(url) {
        if *method != Method::Get {
            return not_found();
        }
        return serve_page(fixtures, &collection, query.as_deref(), page);
    }

    match (method, url) {
        (Method::Get, "/resources") => (
            200,
            json!({"data": {"result": fixtures.resources, "total": fixtures.resources.len()}}),
        ),
        (Method::Post, "/install") => serve_install(fixtures, body),
        (Method::Get, path) => {
            if let Some(name) = path
                .strip_prefix("/forms/")
                .and_then(|rest| rest.strip_suffix("/values"))
            {
                return fixtures
                    .forms
                    .get(name)
                    .map_or_else(not_found, |form| (200, form.values.clone()));
            }
            if let Some(name) = path.strip_prefix("/forms/") {
                return fixtures
                    .forms
                    .get(name)
                    .map_or_else(not_found, |form| (200, json!({"data": form.schema})));
            }
            not_found()
        }
        (Method::Post, path) => match path.strip_prefix("/forms/") {
            Some(name) if fixtures.forms.contains_key(name) => {
                if body.is_some_and(Value::is_object) {
                    (200, json!({"saved": true}))
                } else {
                    (422, json!({"detail": [{"msg": "body must be a JSON object"}]}))
                }
            }
            _ => not_found(),
        },
        _ => not_found(),
    }
}

/// `/<collection>[?query=..]/page/<n>`
fn parse_page_url(url: &str) -> Option<(String, Option<String>, usize)> {
    let (prefix, page) = url.rsplit_once("/page/")?;
    let page: usize = page.parse().ok()?;
    let (path, query) = match prefix.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (prefix, None),
    };
    let collection = path.trim_start_matches('/').to_owned();
    let query = query
        .and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("query="))
        })
        .filter(|needle| !needle.is_empty())
        .map(str::to_owned);
    Some((collection, query, page))
}

fn serve_page(fixtures: &Fixtures, collection: &str, query: Option<&str>, page: usize) -> (u16, Value) {
    if fixtures.failing.contains(collection) {
        return (502, json!({"detail": format!("{collection} store unavailable")}));
    }
    let Some(rows) = fixtures.collections.get(collection) else {
        return not_found();
    };

    let matching: Vec<&Value> = rows
        .iter()
        .filter(|row| query.is_none_or(|needle| row.to_string().contains(needle)))
        .collect();
    let page_size = fixtures.page_size.max(1);
    let result: Vec<&Value> = matching
        .iter()
        .skip(page.saturating_mul(page_size))
        .take(page_size)
        .copied()
        .collect();

    (
        200,
        json!({"data": {"result": result, "total": matching.len()}}),
    )
}

fn serve_install(fixtures: &Fixtures, body: Option<&Value>) -> (u16, Value) {
    let Some(body) = body else {
        return (422, json!({"detail": [{"msg": "install body is required"}]}));
    };
    let token = body.get("token").and_then(Value::as_str).unwrap_or_default();
    if token != fixtures.install_token {
        return (403, json!({"detail": "Installation token is invalid"}));
    }

    let needs_admin = body
        .get("needs_admin")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let has_credentials = ["username", "password"].iter().all(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .is_some_and(|value| !value.trim().is_empty())
    });
    let admin = !needs_admin || has_credentials;
    (200, json!([{"admin": admin}]))
}

fn not_found() -> (u16, Value) {
    (404, json!({"detail": "Not found"}))
}
