// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use beacon_api::InstallRequest;
use beacon_app::{FormViewSpec, ListEndpoint, ListViewSpec, ViewOptions, ViewSpec};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "beacon";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:8686";
const DEFAULT_API_TIMEOUT: &str = "5s";
const DEFAULT_TIME_FIELD: &str = "metadata.time.insert";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub lists: Vec<ListConfig>,
    #[serde(default)]
    pub forms: Vec<FormConfig>,
    #[serde(default)]
    pub install: Install,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            lists: Vec::new(),
            forms: Vec::new(),
            install: Install::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub show_pii: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListConfig {
    pub label: String,
    pub url: String,
    /// Seconds between background refreshes; zero disables them.
    #[serde(default)]
    pub refresh_interval: u64,
    pub time_field: Option<String>,
    #[serde(default)]
    pub filter_fields: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    pub label: String,
    pub schema_url: String,
    pub submit_url: String,
    pub values_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Install {
    pub token: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default)]
    pub update_mapping: bool,
    pub needs_admin: Option<bool>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("BEACON_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set BEACON_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top, above [api]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            url::Url::parse(base_url).with_context(|| {
                format!(
                    "api.base_url in {} is not a valid URL: {base_url:?}",
                    path.display()
                )
            })?;
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        for (index, list) in self.lists.iter().enumerate() {
            if list.label.trim().is_empty() {
                bail!("lists[{index}].label in {} must not be empty", path.display());
            }
            check_endpoint(path, &format!("lists[{index}].url"), &list.url)?;
        }

        for (index, form) in self.forms.iter().enumerate() {
            if form.label.trim().is_empty() {
                bail!("forms[{index}].label in {} must not be empty", path.display());
            }
            check_endpoint(path, &format!("forms[{index}].schema_url"), &form.schema_url)?;
            check_endpoint(path, &format!("forms[{index}].submit_url"), &form.submit_url)?;
            if let Some(values_url) = &form.values_url {
                check_endpoint(path, &format!("forms[{index}].values_url"), values_url)?;
            }
        }

        Ok(())
    }

    /// The file wins over `BEACON_API_URL`; the built-in default comes last.
    pub fn api_base_url(&self) -> String {
        if let Some(base_url) = &self.api.base_url {
            return base_url.trim_end_matches('/').to_owned();
        }
        env::var("BEACON_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            show_pii: self.ui.show_pii.unwrap_or(false),
        }
    }

    pub fn views(&self) -> Vec<ViewSpec> {
        let lists = if self.lists.is_empty() {
            default_lists()
        } else {
            self.lists.clone()
        };

        let mut views: Vec<ViewSpec> = lists
            .into_iter()
            .map(|list| {
                ViewSpec::List(ListViewSpec {
                    label: list.label,
                    endpoint: ListEndpoint::new(list.url),
                    refresh_interval: Duration::from_secs(list.refresh_interval),
                    time_field: list.time_field,
                    filter_fields: list.filter_fields,
                })
            })
            .collect();
        views.extend(self.forms.iter().map(|form| {
            ViewSpec::Form(FormViewSpec {
                label: form.label.clone(),
                schema_url: form.schema_url.clone(),
                submit_url: form.submit_url.clone(),
                values_url: form.values_url.clone(),
            })
        }));
        views
    }

    /// Builds the installer body. Env secrets override the file;
    /// `fallback_token` is used only when neither provides a token.
    pub fn install_request(&self, fallback_token: Option<&str>) -> Result<InstallRequest> {
        let token = non_empty_env("BEACON_INSTALL_TOKEN")
            .or_else(|| self.install.token.clone().filter(|token| !token.is_empty()))
            .or_else(|| fallback_token.map(str::to_owned))
            .ok_or_else(|| {
                anyhow!("no installation token; set [install].token or BEACON_INSTALL_TOKEN")
            })?;
        let password = non_empty_env("BEACON_ADMIN_PASSWORD")
            .or_else(|| self.install.admin_password.clone())
            .unwrap_or_default();
        let username = self.install.admin_email.clone().unwrap_or_default();
        let needs_admin = self.install.needs_admin.unwrap_or(true);

        if needs_admin && (username.trim().is_empty() || password.is_empty()) {
            bail!(
                "[install].needs_admin is set; provide [install].admin_email and admin_password (or BEACON_ADMIN_PASSWORD)"
            );
        }

        Ok(InstallRequest {
            username,
            password,
            token,
            needs_admin,
            update_mapping: self.install.update_mapping,
        })
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# beacon config\n# Place this file at: {}\n\nversion = 1\n\n[api]\n# BEACON_API_URL is used when base_url is not set here.\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[ui]\nshow_pii = false\n\n[[lists]]\nlabel = \"Profiles\"\nurl = \"/profiles\"\ntime_field = \"{}\"\nfilter_fields = [\"id\"]\n\n[[lists]]\nlabel = \"Events\"\nurl = \"/events\"\nrefresh_interval = 10\ntime_field = \"{}\"\n\n# [[forms]]\n# label = \"Copy trait\"\n# schema_url = \"/forms/copy-trait\"\n# submit_url = \"/forms/copy-trait\"\n# values_url = \"/forms/copy-trait/values\"\n\n[install]\n# BEACON_INSTALL_TOKEN and BEACON_ADMIN_PASSWORD override these.\n# token = \"\"\n# admin_email = \"admin@example.com\"\n# admin_password = \"\"\nneeds_admin = true\nupdate_mapping = false\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            DEFAULT_TIME_FIELD,
            DEFAULT_TIME_FIELD,
        )
    }
}

fn default_lists() -> Vec<ListConfig> {
    ["Profiles", "Sessions", "Events"]
        .into_iter()
        .map(|label| ListConfig {
            label: label.to_owned(),
            url: format!("/{}", label.to_lowercase()),
            refresh_interval: 0,
            time_field: Some(DEFAULT_TIME_FIELD.to_owned()),
            filter_fields: Vec::new(),
        })
        .collect()
}

fn check_endpoint(path: &Path, key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{key} in {} must not be empty", path.display());
    }
    if !value.starts_with('/') {
        bail!(
            "{key} in {} must be a path starting with '/', got {value:?}; the host belongs in [api].base_url",
            path.display()
        );
    }
    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
