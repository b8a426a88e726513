// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use time::OffsetDateTime;

use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEndpoint {
    pub url: String,
}

impl ListEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Filters are baked into `url`; only `/page/<n>` is appended.
    pub fn page_url(&self, page: u32) -> String {
        format!("{}/page/{page}", self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub result: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub endpoint: ListEndpoint,
    pub page: u32,
    pub request_id: RequestId,
    pub fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    request_id: RequestId,
    page: u32,
    fresh: bool,
}

/// Row set and pagination bookkeeping for one mounted list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    endpoint: ListEndpoint,
    refresh_interval: Duration,
    rows: Vec<Value>,
    page: u32,
    has_more: bool,
    total: u64,
    phase: ListPhase,
    error: Option<String>,
    mounted: bool,
    in_flight: Option<InFlight>,
    last_request: RequestId,
    spinner_allowed: bool,
    spinner: bool,
    loaded_at: Option<OffsetDateTime>,
}

impl ListState {
    pub fn new(endpoint: ListEndpoint, refresh_interval: Duration) -> Self {
        Self {
            endpoint,
            refresh_interval,
            rows: Vec::new(),
            page: 0,
            has_more: false,
            total: 0,
            phase: ListPhase::Idle,
            error: None,
            mounted: true,
            in_flight: None,
            last_request: RequestId::default(),
            spinner_allowed: true,
            spinner: false,
            loaded_at: None,
        }
    }

    pub fn endpoint(&self) -> &ListEndpoint {
        &self.endpoint
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn loaded_at(&self) -> Option<OffsetDateTime> {
        self.loaded_at
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.map(|in_flight| in_flight.request_id)
    }

    /// Only the first load of a mount blocks the view with a spinner.
    pub fn show_spinner(&self) -> bool {
        self.phase == ListPhase::Loading && self.spinner
    }

    pub fn refresh_enabled(&self) -> bool {
        !self.refresh_interval.is_zero()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.refresh_enabled() && self.phase != ListPhase::Errored
    }

    pub fn summary_text(&self) -> String {
        format!(
            "Showing {} of {} total records",
            self.rows.len(),
            self.total
        )
    }

    /// First load after mount.
    pub fn start(&mut self) -> Option<ListRequest> {
        let spinner = self.spinner_allowed;
        self.spinner_allowed = false;
        self.issue(false, spinner)
    }

    /// Next page for infinite scroll. Ignored while a request is in flight,
    /// after an empty page, or while periodic refresh is on.
    pub fn load_more(&mut self) -> Option<ListRequest> {
        if !self.mounted || self.in_flight.is_some() || !self.can_load_more() {
            return None;
        }
        self.page = self.page.saturating_add(1);
        self.issue(false, false)
    }

    /// Timer tick. A fresh page-0 load that supersedes anything in flight.
    /// An errored list stays errored until [`ListState::reset`].
    pub fn refresh_tick(&mut self) -> Option<ListRequest> {
        if !self.refresh_enabled() || self.phase == ListPhase::Errored {
            return None;
        }
        self.page = 0;
        let spinner = self.spinner && self.rows.is_empty();
        self.issue(true, spinner)
    }

    /// Full reload from page 0, keeping rows visible until the new page lands.
    pub fn reset(&mut self) -> Option<ListRequest> {
        self.page = 0;
        self.has_more = false;
        self.error = None;
        self.issue(true, false)
    }

    pub fn set_endpoint(&mut self, endpoint: ListEndpoint) -> Option<ListRequest> {
        self.endpoint = endpoint;
        self.rows.clear();
        self.total = 0;
        self.reset()
    }

    pub fn set_refresh_interval(&mut self, interval: Duration) {
        self.refresh_interval = interval;
        if self.refresh_enabled() {
            self.page = 0;
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = None;
    }

    /// Applies a page response. Returns false, leaving state untouched, when
    /// the view is gone or the response belongs to a superseded request.
    pub fn apply_page(&mut self, request_id: RequestId, page: ListPage) -> bool {
        let Some(in_flight) = self.take_in_flight(request_id) else {
            return false;
        };

        self.has_more = !page.result.is_empty();
        self.total = page.total;
        if in_flight.page == 0 || in_flight.fresh {
            self.rows = page.result;
        } else {
            self.rows.extend(page.result);
        }
        self.phase = ListPhase::Loaded;
        self.error = None;
        self.spinner = false;
        self.loaded_at = Some(OffsetDateTime::now_utc());
        true
    }

    pub fn apply_error(&mut self, request_id: RequestId, error: impl Into<String>) -> bool {
        if self.take_in_flight(request_id).is_none() {
            return false;
        }
        self.phase = ListPhase::Errored;
        self.error = Some(error.into());
        self.spinner = false;
        true
    }

    fn take_in_flight(&mut self, request_id: RequestId) -> Option<InFlight> {
        if !self.mounted {
            return None;
        }
        match self.in_flight {
            Some(in_flight) if in_flight.request_id == request_id => self.in_flight.take(),
            _ => None,
        }
    }

    fn issue(&mut self, fresh: bool, spinner: bool) -> Option<ListRequest> {
        if !self.mounted {
            return None;
        }
        self.last_request = self.last_request.next();
        self.in_flight = Some(InFlight {
            request_id: self.last_request,
            page: self.page,
            fresh,
        });
        self.phase = ListPhase::Loading;
        self.spinner = spinner;
        Some(ListRequest {
            endpoint: self.endpoint.clone(),
            page: self.page,
            request_id: self.last_request,
            fresh,
        })
    }
}
