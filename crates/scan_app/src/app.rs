use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, bail, Context};
use scan_core::{AppState, Msg, Phase, Store, SubmissionState};
use scan_logging::{scan_info, scan_warn};

use crate::cli::Cli;
use crate::effects::EffectRunner;
use crate::ui::constants::{HELP_TEXT, PROMPT};
use crate::ui::input::{parse_command, Command, InputError};
use crate::ui::render::render;
use crate::{logging, settings};

/// Everything the main loop reacts to: operator input and engine completions.
pub enum AppEvent {
    Dispatch(Msg),
    Show,
    Help,
    Quit,
    Rejected(InputError),
}

impl From<Command> for AppEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Dispatch(msg) => AppEvent::Dispatch(msg),
            Command::Show => AppEvent::Show,
            Command::Help => AppEvent::Help,
            Command::Quit => AppEvent::Quit,
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log, cli.verbose);

    let mut app_settings = settings::load_settings(cli.settings.as_deref())?;
    if let Some(service_url) = cli.service_url.clone() {
        app_settings.service_url = service_url;
    }
    scan_info!("Scanning service: {}", app_settings.service_url);

    let initial = match cli.config.as_deref() {
        Some(path) => AppState::with_config(settings::load_scan_config(path)?),
        None => AppState::new(),
    };
    let mut store = Store::new(initial);
    seed_from_cli(&mut store, cli.base_url.clone(), &cli.endpoints);

    let (event_tx, event_rx) = mpsc::channel();
    let runner = EffectRunner::new(app_settings.submit_settings(), event_tx.clone())
        .context("starting submission engine")?;

    if cli.submit {
        run_batch(store, &runner, &event_rx)
    } else {
        run_interactive(store, &runner, event_tx, &event_rx)
    }
}

/// Replays CLI-provided fields as ordinary edits so they go through the same
/// transitions as typed input.
fn seed_from_cli(store: &mut Store, base_url: Option<String>, endpoints: &[String]) {
    if let Some(base_url) = base_url {
        store.dispatch(Msg::BaseUrlChanged(base_url));
    }
    for (index, endpoint) in endpoints.iter().enumerate() {
        if index >= store.state().config().endpoint_count() {
            store.dispatch(Msg::EndpointAdded);
        }
        store.dispatch(Msg::EndpointChanged {
            index,
            value: endpoint.clone(),
        });
    }
}

fn run_batch(
    mut store: Store,
    runner: &EffectRunner,
    events: &mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    runner.run(store.dispatch(Msg::SubmitClicked));

    while store.state().phase() == Phase::Pending {
        match events.recv() {
            Ok(AppEvent::Dispatch(msg)) => runner.run(store.dispatch(msg)),
            Ok(_) => {}
            Err(_) => bail!("event channel closed while a scan was pending"),
        }
    }

    match store.state().submission() {
        SubmissionState::Succeeded { result } => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        SubmissionState::Failed { error } => Err(anyhow!(
            "scan failed ({}): {}",
            error.category,
            error.message
        )),
        SubmissionState::Idle | SubmissionState::Pending { .. } => Ok(()),
    }
}

fn run_interactive(
    mut store: Store,
    runner: &EffectRunner,
    event_tx: mpsc::Sender<AppEvent>,
    events: &mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    let views = store.subscribe();
    let renderer = thread::spawn(move || {
        for view in views {
            let mut out = io::stdout().lock();
            let _ = write!(out, "{}{}", render(&view), PROMPT);
            let _ = out.flush();
        }
    });
    spawn_input_reader(event_tx);

    while let Ok(event) = events.recv() {
        match event {
            AppEvent::Dispatch(msg) => runner.run(store.dispatch(msg)),
            AppEvent::Show => print_block(&render(&store.state().view())),
            AppEvent::Help => print_block(HELP_TEXT),
            AppEvent::Rejected(err) => print_block(&err.to_string()),
            AppEvent::Quit => {
                if store.state().phase() == Phase::Pending {
                    runner.run(store.dispatch(Msg::CancelClicked));
                }
                break;
            }
        }
    }

    // Dropping the store closes the view channel and lets the renderer finish.
    drop(store);
    let _ = renderer.join();
    Ok(())
}

fn print_block(text: &str) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{text}");
    let _ = write!(out, "{PROMPT}");
    let _ = out.flush();
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || forward_input(io::stdin().lock(), &event_tx));
}

fn forward_input(reader: impl BufRead, event_tx: &mpsc::Sender<AppEvent>) {
    for line in reader.lines() {
        let event = match line {
            Ok(line) => match parse_command(&line) {
                Ok(Some(command)) => AppEvent::from(command),
                Ok(None) => continue,
                Err(err) => AppEvent::Rejected(err),
            },
            // The offending line is already consumed; keep the session alive.
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                scan_warn!("Skipping input line that is not valid UTF-8: {}", err);
                continue;
            }
            Err(err) => {
                scan_warn!("Failed to read input: {}", err);
                break;
            }
        };
        if event_tx.send(event).is_err() {
            return;
        }
    }
    // End of input behaves like `quit`.
    let _ = event_tx.send(AppEvent::Quit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scan_engine::SubmitSettings;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn seed_replays_cli_fields_in_order() {
        let mut store = Store::default();
        seed_from_cli(
            &mut store,
            Some("https://api.example.com".to_string()),
            &["/users".to_string(), "/orders".to_string(), "".to_string()],
        );

        let config = store.state().config();
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.endpoints(), &["/users", "/orders", ""]);
        assert_eq!(store.state().phase(), Phase::Idle);
    }

    #[test]
    fn seed_without_endpoints_keeps_the_initial_row() {
        let mut store = Store::default();
        seed_from_cli(&mut store, None, &[]);
        assert_eq!(store.state().config().endpoints(), &[String::new()]);
    }

    #[test]
    fn invalid_utf8_line_does_not_end_the_session() {
        let (tx, rx) = mpsc::channel();
        let input: &[u8] = b"url https://api.example.com\n\xff\xfe\nshow\n";
        forward_input(input, &tx);

        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            AppEvent::Dispatch(Msg::BaseUrlChanged(url)) if url == "https://api.example.com"
        ));
        assert!(matches!(events[1], AppEvent::Show));
        assert!(matches!(events[2], AppEvent::Quit));
    }

    fn batch_against(service_url: String) -> anyhow::Result<()> {
        let (event_tx, event_rx) = mpsc::channel();
        let settings = SubmitSettings {
            service_url,
            ..SubmitSettings::default()
        };
        let runner = EffectRunner::new(settings, event_tx).expect("engine runtime");
        let mut store = Store::default();
        seed_from_cli(
            &mut store,
            Some("https://api.example.com".to_string()),
            &["/users".to_string()],
        );
        run_batch(store, &runner, &event_rx)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn batch_scan_succeeds_on_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scan"))
            .and(body_json(json!({
                "api": {"base_url": "https://api.example.com", "endpoints": ["/users"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vulnerabilities": []})))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let outcome = tokio::task::spawn_blocking(move || batch_against(uri))
            .await
            .expect("batch thread");
        assert!(outcome.is_ok(), "{outcome:?}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn batch_scan_reports_server_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scan"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = tokio::task::spawn_blocking(move || batch_against(uri))
            .await
            .expect("batch thread")
            .unwrap_err();
        assert!(err.to_string().contains("scan failed (server)"), "{err}");
    }

    #[test]
    fn batch_scan_with_invalid_config_fails_without_sending() {
        let (event_tx, event_rx) = mpsc::channel();
        let runner =
            EffectRunner::new(SubmitSettings::default(), event_tx).expect("engine runtime");
        let err = run_batch(Store::default(), &runner, &event_rx).unwrap_err();
        assert!(err.to_string().contains("scan failed (invalid config)"), "{err}");
    }
}
