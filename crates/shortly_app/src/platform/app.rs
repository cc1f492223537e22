use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use shortly_core::{resolve_route, update, AppState, AppViewModel, Msg, Route};
use shortly_logging::{shortly_info, shortly_warn};

use super::cli::ConfigArgs;
use super::effects::EffectRunner;
use super::ui::commands::{parse_command, Command, HELP};
use super::ui::render::render;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Extra time a one-shot run waits beyond the transport timeout.
const ONE_SHOT_GRACE: Duration = Duration::from_secs(5);

pub fn run_interactive(args: &ConfigArgs) -> Result<()> {
    let config = args.client_config();
    config.validate().context("invalid client configuration")?;
    let runner = EffectRunner::new(args)?;
    let mut driver = Driver::new(AppState::new(config), &runner, true);

    let (line_tx, line_rx) = mpsc::channel::<String>();
    spawn_stdin_reader(line_tx).context("failed to read from stdin")?;

    println!("{HELP}\n");
    driver.print_screen();
    shortly_info!("Interactive session started");

    loop {
        driver.pump();
        match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match parse_command(&line) {
                Ok(Command::Msg(msg)) => driver.dispatch(msg),
                Ok(Command::Show) => driver.print_screen(),
                Ok(Command::Help) => println!("{HELP}\n"),
                Ok(Command::Quit) => break,
                Err(message) => println!("{message}\n"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Stdin closed: let in-flight calls land before leaving.
                if !driver.is_busy() {
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    shortly_info!("Interactive session ended");
    Ok(())
}

pub fn run_shorten(args: &ConfigArgs, url: String, token: String, login: bool) -> Result<()> {
    let config = args.client_config();
    config.validate().context("invalid client configuration")?;
    let runner = EffectRunner::new(args)?;
    let mut driver = Driver::new(AppState::new(config), &runner, false);
    let timeout = args.api_settings().request_timeout + ONE_SHOT_GRACE;

    if login {
        driver.dispatch(Msg::LoginClicked);
        driver.wait_idle(timeout)?;
        if !driver.state.session().is_signed_in() {
            return Err(failure(&driver.state.view(), "login failed"));
        }
    }

    driver.dispatch(Msg::InputChanged(url));
    driver.dispatch(Msg::TokenAcquired(token));
    driver.dispatch(Msg::SubmitClicked);
    driver.wait_idle(timeout)?;

    let view = driver.state.view();
    match view.result_short_url {
        Some(short_url) => {
            println!("{short_url}");
            Ok(())
        }
        None => Err(failure(&view, "no result")),
    }
}

pub fn run_resolve(args: &ConfigArgs, path: &str) {
    match resolve_route(&args.client_config(), path) {
        Route::Form => println!("(form)"),
        Route::Redirect { target } => {
            shortly_info!("Resolved {} -> {}", path, target);
            println!("{target}");
        }
    }
}

fn failure(view: &AppViewModel, fallback: &str) -> anyhow::Error {
    anyhow!(view
        .error_message
        .clone()
        .unwrap_or_else(|| fallback.to_string()))
}

fn spawn_stdin_reader(tx: mpsc::Sender<String>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    shortly_warn!("Stopped reading stdin");
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

/// Owns the state and feeds it messages from the terminal and the engine.
struct Driver<'a> {
    state: AppState,
    runner: &'a EffectRunner,
    echo: bool,
}

impl<'a> Driver<'a> {
    fn new(state: AppState, runner: &'a EffectRunner, echo: bool) -> Self {
        Self {
            state,
            runner,
            echo,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
        if self.state.consume_dirty() && self.echo {
            self.print_screen();
        }
    }

    /// Applies every engine completion that has arrived.
    fn pump(&mut self) {
        while let Some(msg) = self.runner.try_recv() {
            self.dispatch(msg);
        }
    }

    fn is_busy(&self) -> bool {
        self.state.has_calls_in_flight()
    }

    fn wait_idle(&mut self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .context("timed out waiting for the backend")?;
            if let Some(msg) = self.runner.recv_timeout(remaining.min(POLL_INTERVAL)) {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn print_screen(&self) {
        let site_key = &self.state.config().widget_site_key;
        let mut out = io::stdout().lock();
        for line in render(&self.state.view(), site_key) {
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out);
    }
}
