// Library root
// ------------
// The binary (`main.rs`) only parses arguments and starts the loop; all the
// behavior lives here so it can be driven from tests without a terminal.
//
// Module responsibilities:
// - `cli`: arguments and the validated `Config` passed to everything else.
// - `api`: the request issuer, one blocking HTTP call per job.
// - `router`: classifies console input and runs jobs into loop messages.
// - `scrollback`, `await_overlay`, `backup`: state behind the screens.
// - `screen`, `login`, `console`, `browser`: the screen state machine.
// - `ui`: ratatui rendering. `runtime`: terminal setup and the event loop.
pub mod api;
pub mod await_overlay;
pub mod backup;
pub mod browser;
pub mod cli;
pub mod console;
pub mod error;
pub mod logging;
pub mod login;
pub mod router;
pub mod runtime;
pub mod screen;
pub mod scrollback;
pub mod ui;
