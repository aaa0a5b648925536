// Console history: the bounded log of (label, body) entries, the view
// position over its reflowed lines, and the recall cursor over commands the
// user typed.

use std::collections::VecDeque;
use unicode_width::UnicodeWidthStr;

/// Label used when the user submits an empty line.
pub const EMPTY_INPUT_LABEL: &str = "(empty)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub body: String,
}

impl Entry {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Entry {
            label: label.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Label,
    Body,
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub kind: LineKind,
    pub text: String,
}

/// Reflow `text` to `width` terminal cells. Newlines become spaces first,
/// then words are packed greedily; a word wider than `width` keeps its own
/// line instead of being split.
pub fn reflow(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let collapsed: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in collapsed.split(' ') {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        if current.width() + 1 + word.width() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            push_trimmed(&mut lines, &current);
            current = word.to_string();
        }
    }
    push_trimmed(&mut lines, &current);
    lines
}

fn push_trimmed(lines: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim_end();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct Scrollback {
    entries: VecDeque<Entry>,
    limit: usize,
    width: usize,
    height: usize,
    offset: usize,
    /// Cleared when the user scrolls away from the bottom.
    follow: bool,
    commands: Vec<String>,
    cursor: Option<usize>,
    /// Reflowed line count of `entries` at `width`.
    line_count: usize,
}

fn entry_lines(entry: &Entry, width: usize) -> impl Iterator<Item = DisplayLine> {
    let label = reflow(&entry.label, width)
        .into_iter()
        .map(|text| DisplayLine { kind: LineKind::Label, text });
    let body = reflow(&entry.body, width)
        .into_iter()
        .map(|text| DisplayLine { kind: LineKind::Body, text });
    label.chain(body).chain(std::iter::once(DisplayLine {
        kind: LineKind::Separator,
        text: String::new(),
    }))
}

fn entry_height(entry: &Entry, width: usize) -> usize {
    reflow(&entry.label, width).len() + reflow(&entry.body, width).len() + 1
}

impl Scrollback {
    pub fn new(limit: usize) -> Self {
        Scrollback {
            entries: VecDeque::new(),
            limit: limit.max(1),
            width: 80,
            height: 0,
            offset: 0,
            follow: true,
            commands: Vec::new(),
            cursor: None,
            line_count: 0,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: Entry) {
        self.line_count += entry_height(&entry, self.width);
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            if let Some(evicted) = self.entries.pop_front() {
                self.line_count -= entry_height(&evicted, self.width);
            }
        }
        if self.follow {
            self.offset = self.bottom();
        } else {
            self.offset = self.offset.min(self.bottom());
        }
    }

    /// All entries reflowed to `width`.
    pub fn render(&self, width: usize) -> Vec<DisplayLine> {
        self.entries
            .iter()
            .flat_map(|entry| entry_lines(entry, width))
            .collect()
    }

    /// Lines currently inside the viewport. Only entries overlapping it are
    /// reflowed.
    pub fn visible(&self) -> Vec<DisplayLine> {
        let mut out = Vec::with_capacity(self.height);
        let mut skip = self.offset;
        for entry in &self.entries {
            if out.len() >= self.height {
                break;
            }
            let height = entry_height(entry, self.width);
            if skip >= height {
                skip -= height;
                continue;
            }
            let room = self.height - out.len();
            out.extend(entry_lines(entry, self.width).skip(skip).take(room));
            skip = 0;
        }
        out
    }

    pub fn total_lines(&self) -> usize {
        self.line_count
    }

    fn bottom(&self) -> usize {
        self.total_lines().saturating_sub(self.height)
    }

    /// Apply a new viewport size. Safe to call repeatedly with the same size.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(1);
        if width != self.width {
            self.width = width;
            self.line_count = self.entries.iter().map(|e| entry_height(e, width)).sum();
        }
        self.height = height;
        if self.follow {
            self.offset = self.bottom();
        } else {
            self.offset = self.offset.min(self.bottom());
        }
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn at_bottom(&self) -> bool {
        self.offset >= self.bottom()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let target = self.offset.saturating_sub(lines);
        if target < self.bottom() {
            self.follow = false;
        }
        self.offset = target;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let bottom = self.bottom();
        self.offset = (self.offset + lines).min(bottom);
        if self.offset >= bottom {
            self.follow = true;
        }
    }

    /// Remember a submitted command and reset the recall cursor.
    pub fn record_command(&mut self, command: &str) {
        if !command.is_empty() {
            self.commands.push(command.to_string());
        }
        self.cursor = None;
    }

    /// Step back to an older command. Stops at the oldest one.
    pub fn history_prev(&mut self) -> Option<&str> {
        if self.commands.is_empty() {
            return None;
        }
        let idx = match self.cursor {
            None => self.commands.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(idx);
        self.commands.get(idx).map(String::as_str)
    }

    /// Step forward to a newer command; `None` once past the newest.
    pub fn history_next(&mut self) -> Option<&str> {
        let next = self.cursor.map(|i| i + 1).filter(|&i| i < self.commands.len());
        self.cursor = next;
        next.and_then(|i| self.commands.get(i)).map(String::as_str)
    }

    pub fn history_cursor(&self) -> Option<usize> {
        self.cursor
    }
}
