// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use beacon_api::Client;
use beacon_app::{FormSchema, FormValues, ListEndpoint, ListPage, ListRequest, ResourceOption};
use beacon_tui::{InternalEvent, PageTarget};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, info, warn};

/// Serves the TUI from the live API. Page loads run on worker threads so
/// the event loop keeps drawing while a request is in flight.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl beacon_tui::AppRuntime for ApiRuntime {
    fn fetch_page(&mut self, endpoint: &ListEndpoint, page: u32) -> Result<ListPage> {
        self.client.fetch_page(endpoint, page)
    }

    fn load_form_schema(&mut self, url: &str) -> Result<FormSchema> {
        self.client.fetch_schema(url)
    }

    fn load_form_values(&mut self, url: &str) -> Result<FormValues> {
        self.client.fetch_values(url)
    }

    fn load_resources(&mut self) -> Result<Vec<ResourceOption>> {
        self.client.list_resources()
    }

    fn submit_form(&mut self, url: &str, values: &FormValues) -> Result<()> {
        self.client.submit_values(url, values)?;
        info!(url, fields = values.len(), "form submitted");
        Ok(())
    }

    fn spawn_page_load(
        &mut self,
        target: PageTarget,
        request: &ListRequest,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let request = request.clone();
        debug!(
            url = %request.endpoint.page_url(request.page),
            view = target.view,
            "spawning page load"
        );
        thread::Builder::new()
            .name("beacon-page".to_owned())
            .spawn(move || {
                let result = client
                    .fetch_page(&request.endpoint, request.page)
                    .map_err(|error| {
                        warn!(error = %format!("{error:#}"), "page load failed");
                        format!("{error:#}")
                    });
                // The receiver is gone once the TUI exits; nothing to report.
                let _ = tx.send(InternalEvent::PageLoaded {
                    target,
                    request_id: request.request_id,
                    result,
                });
            })
            .context("spawn page loader thread")?;
        Ok(())
    }
}
