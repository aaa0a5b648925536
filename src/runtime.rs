// Event loop. One thread owns the `App`; terminal input, the ticker and
// request workers only send `Msg` values over a channel. Effects returned by
// each update are carried out here.

use crate::api::ApiClient;
use crate::cli::Config;
use crate::router::{Dispatcher, Job};
use crate::screen::{App, Effect, Msg};
use crate::ui;
use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TICK_RATE: Duration = Duration::from_millis(100);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the client until the user quits. The terminal is restored on every
/// exit path, including errors during setup and panics.
pub fn run(config: &Config) -> Result<()> {
    let api = ApiClient::new(config).context("building HTTP client")?;
    let dispatcher = Dispatcher::new(api, config.time_offset);

    install_panic_hook();
    enable_raw_mode().context("enabling raw mode")?;
    let _restore = RestoreGuard::new(|| {
        if let Err(e) = reset_terminal() {
            warn!(error = %e, "restoring terminal failed");
        }
    });
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, App::new(config), dispatcher);
    terminal.show_cursor()?;
    result
}

/// Calls `restore` when dropped: on normal return, on `?` early returns and
/// while unwinding.
pub struct RestoreGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> RestoreGuard<F> {
    pub fn new(restore: F) -> Self {
        RestoreGuard { restore }
    }
}

impl<F: FnMut()> Drop for RestoreGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

// The hook runs before unwinding starts, so the panic message is printed on
// the normal screen instead of the alternate one.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = reset_terminal();
        default_hook(info);
    }));
}

fn reset_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

fn setup_terminal() -> Result<Tui> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("entering alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;
    terminal.clear()?;
    Ok(terminal)
}

/// Map a terminal event to a loop message. Key releases are dropped.
pub fn translate(event: Event) -> Option<Msg> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(Msg::Key(key)),
        Event::Mouse(mouse) => Some(Msg::Mouse(mouse)),
        Event::Resize(width, height) => Some(Msg::Resize { width, height }),
        _ => None,
    }
}

fn spawn_input(tx: Sender<Msg>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if let Some(msg) = translate(ev) {
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "terminal input failed");
                break;
            }
        }
    });
}

fn spawn_ticker(tx: Sender<Msg>) {
    thread::spawn(move || loop {
        thread::sleep(TICK_RATE);
        if tx.send(Msg::Tick).is_err() {
            break;
        }
    });
}

/// Run `job` on its own thread and post the result. Nobody waits for it;
/// if the loop is gone by then the result is dropped.
pub fn spawn_job(dispatcher: &Dispatcher, job: Job, tx: Sender<Msg>) {
    let dispatcher = dispatcher.clone();
    thread::spawn(move || {
        let msg = dispatcher.run(job);
        let _ = tx.send(msg);
    });
}

/// Apply one message and carry out the effects. Posted messages are queued
/// in `local` and handled before any new channel traffic. Returns `false`
/// once the user asked to quit.
pub fn step(
    app: App,
    msg: Msg,
    dispatcher: &Dispatcher,
    tx: &Sender<Msg>,
    local: &mut VecDeque<Msg>,
) -> (App, bool) {
    let (app, effects) = app.update(msg);
    for effect in effects {
        match effect {
            Effect::Issue(job) => {
                debug!(kind = job.kind(), "spawning job");
                spawn_job(dispatcher, job, tx.clone());
            }
            Effect::Post(msg) => local.push_back(msg),
            Effect::Quit => return (app, false),
        }
    }
    (app, true)
}

fn next_msg(local: &mut VecDeque<Msg>, rx: &Receiver<Msg>) -> Option<Msg> {
    local.pop_front().or_else(|| rx.recv().ok())
}

fn event_loop(terminal: &mut Tui, app: App, dispatcher: Dispatcher) -> Result<()> {
    let (tx, rx) = unbounded();
    spawn_input(tx.clone());
    spawn_ticker(tx.clone());

    let size = terminal.size()?;
    let mut local = VecDeque::from([Msg::Resize {
        width: size.width,
        height: size.height,
    }]);
    let mut app = app;
    info!("client started");

    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;
        let Some(msg) = next_msg(&mut local, &rx) else {
            break;
        };
        let (next, running) = step(app, msg, &dispatcher, &tx, &mut local);
        app = next;
        if !running {
            info!("quit requested");
            break;
        }
    }
    Ok(())
}
