// Await overlay: wraps one pending operation with a spinner and a running
// clock. It goes Running -> Succeeded | Failed exactly once, on the
// operation's completion message, and then waits for a key press.

use indicatif::{HumanDuration, ProgressStyle};
use std::time::{Duration, Instant};

/// Once a task runs longer than this the overlay says so.
pub const STILL_RUNNING_AFTER: Duration = Duration::from_secs(3);

const SPINNER_FRAMES: &[&str] = &["|", "/", "-", "\\", " "];

/// Result of a task, delivered to the return screen once acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub title: String,
    pub message: String,
    pub success: bool,
}

impl Outcome {
    pub fn succeeded(title: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome {
            title: title.into(),
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(title: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome {
            title: title.into(),
            message: message.into(),
            success: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    Running,
    Succeeded(Outcome),
    Failed(Outcome),
}

#[derive(Debug, Clone)]
pub struct AwaitOverlay {
    label: String,
    started_at: Instant,
    deadline: Instant,
    state: OverlayState,
    ticks: u64,
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner().tick_strings(SPINNER_FRAMES)
}

impl AwaitOverlay {
    /// `timeout` should match the deadline the request itself was issued with.
    pub fn new(label: impl Into<String>, timeout: Duration) -> Self {
        Self::started_at(label, timeout, Instant::now())
    }

    pub fn started_at(label: impl Into<String>, timeout: Duration, started_at: Instant) -> Self {
        AwaitOverlay {
            label: label.into(),
            started_at,
            deadline: started_at + timeout,
            state: OverlayState::Running,
            ticks: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, OverlayState::Running)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            OverlayState::Running => None,
            OverlayState::Succeeded(o) | OverlayState::Failed(o) => Some(o),
        }
    }

    pub fn take_outcome(self) -> Option<Outcome> {
        match self.state {
            OverlayState::Running => None,
            OverlayState::Succeeded(o) | OverlayState::Failed(o) => Some(o),
        }
    }

    /// Record the operation's result. Ignored once already terminal.
    pub fn complete(&mut self, outcome: Outcome) {
        if self.is_terminal() {
            return;
        }
        self.state = if outcome.success {
            OverlayState::Succeeded(outcome)
        } else {
            OverlayState::Failed(outcome)
        };
    }

    pub fn tick(&mut self) {
        if !self.is_terminal() {
            self.ticks = self.ticks.wrapping_add(1);
        }
    }

    pub fn spinner_frame(&self) -> String {
        match self.state {
            OverlayState::Running => spinner_style().get_tick_str(self.ticks).to_string(),
            OverlayState::Succeeded(_) => ":)".to_string(),
            OverlayState::Failed(_) => ":(".to_string(),
        }
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Headline text: the label while running, then the verdict.
    pub fn headline(&self) -> &str {
        match self.state {
            OverlayState::Running => &self.label,
            OverlayState::Succeeded(_) => "Task complete!",
            OverlayState::Failed(_) => "Task failed!",
        }
    }

    /// Secondary line under the headline.
    pub fn detail_at(&self, now: Instant) -> String {
        match &self.state {
            OverlayState::Running => {
                let elapsed = self.elapsed_at(now);
                if elapsed >= STILL_RUNNING_AFTER {
                    format!(
                        "Task still running... {} elapsed, gives up in {}",
                        HumanDuration(elapsed),
                        HumanDuration(self.remaining_at(now))
                    )
                } else {
                    format!("{} elapsed", HumanDuration(elapsed))
                }
            }
            OverlayState::Succeeded(o) => o.message.clone(),
            OverlayState::Failed(o) => o.message.clone(),
        }
    }

    pub fn help(&self) -> Option<&'static str> {
        self.is_terminal().then_some("Press any key to continue")
    }
}
