// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use beacon_api::{Client, InstallOutcome, InstallRequest};
use beacon_app::{AppState, FormViewSpec, ViewSpec};
use beacon_testkit::{DEMO_INSTALL_TOKEN, Fixtures, MockApi};
use config::Config;
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `beacon --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let log_path = logging::init(options.verbosity, options.log_stderr)?;

    // Held for the whole session; dropping it stops the server.
    let demo_api = if options.demo {
        Some(MockApi::start(Fixtures::demo()).context("start demo API")?)
    } else {
        None
    };
    let base_url = demo_api
        .as_ref()
        .map_or_else(|| config.api_base_url(), |api| api.base_url().to_owned());

    let client = Client::new(&base_url, config.api_timeout()?).with_context(|| {
        format!(
            "invalid [api] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    info!(
        base_url = client.base_url(),
        demo = options.demo,
        log = ?log_path,
        "beacon starting"
    );
    if options.check_only {
        return Ok(());
    }

    if options.install {
        let fallback_token = options.demo.then_some(DEMO_INSTALL_TOKEN);
        let report = run_installer(&config, &client, fallback_token)?;
        println!("{report}");
        return Ok(());
    }

    let mut views = config.views();
    if options.demo && config.forms.is_empty() {
        views.push(demo_form_view());
    }
    let mut state = AppState::new(views, config.view_options());
    let mut runtime = ApiRuntime::new(client);
    beacon_tui::run_app(&mut state, &mut runtime)
}

fn run_installer(config: &Config, client: &Client, fallback_token: Option<&str>) -> Result<String> {
    let request = config.install_request(fallback_token)?;
    let outcome = client
        .install(&request)
        .with_context(|| format!("install against {}", client.base_url()))?;
    install_report(&request, outcome)
}

fn install_report(request: &InstallRequest, outcome: InstallOutcome) -> Result<String> {
    match (request.needs_admin, outcome.admin) {
        (true, Some(false)) => {
            warn!(username = %request.username, "installer did not create an admin account");
            bail!(
                "could not create admin account for {:?}; check [install].admin_email and admin_password (or BEACON_ADMIN_PASSWORD), then rerun `beacon --install`",
                request.username
            )
        }
        (true, None) => Err(anyhow!(
            "installer did not report an admin account; check the server logs and rerun `beacon --install`"
        )),
        (true, Some(true)) => {
            info!(username = %request.username, "installation complete");
            Ok(format!(
                "installation complete; admin account {} is ready",
                request.username
            ))
        }
        (false, _) => {
            info!("installation complete");
            Ok("installation complete".to_owned())
        }
    }
}

fn demo_form_view() -> ViewSpec {
    ViewSpec::Form(FormViewSpec {
        label: "Copy trait".to_owned(),
        schema_url: "/forms/copy-trait".to_owned(),
        submit_url: "/forms/copy-trait".to_owned(),
        values_url: Some("/forms/copy-trait/values".to_owned()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    demo: bool,
    install: bool,
    verbosity: u8,
    log_stderr: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        demo: false,
        install: false,
        verbosity: 0,
        log_stderr: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--install" => {
                options.install = true;
            }
            "-v" | "--verbose" => {
                options.verbosity = options.verbosity.saturating_add(1);
            }
            "-vv" => {
                options.verbosity = options.verbosity.saturating_add(2);
            }
            "--log-stderr" => {
                options.log_stderr = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("beacon - terminal console for the customer data platform API");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and API client settings, then exit");
    println!("  --demo                   Run against an in-process demo API");
    println!("  --install                Run the installer from [install] and exit");
    println!("  -v, -vv                  Raise log verbosity (BEACON_LOG overrides)");
    println!("  --log-stderr             Log to stderr instead of the log file");
    println!("  --help                   Show this help");
}
