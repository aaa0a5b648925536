// Backup list items and the relative-time labels shown for them.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use indicatif::HumanDuration;

/// File name layout the server uses, e.g. `backup-2024-03-01-18-30-00.zip`.
pub const BACKUP_NAME_FORMAT: &str = "backup-%Y-%m-%d-%H-%M-%S.zip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupItem {
    /// Humanized timestamp ("3 hours ago"), or the raw name when it does not parse.
    pub display_name: String,
    /// Identifier sent back to the server on restore.
    pub raw_id: String,
}

impl BackupItem {
    pub fn from_name(raw: &str, offset: Duration, now: DateTime<Utc>) -> Self {
        let display_name = parse_backup_time(raw)
            .map(|t| humanize_since(t + offset, now))
            .unwrap_or_else(|| raw.to_string());
        BackupItem {
            display_name,
            raw_id: raw.to_string(),
        }
    }
}

/// Build display items for a fetched listing, keeping the server's order.
pub fn items_from_names(names: &[String], offset: Duration, now: DateTime<Utc>) -> Vec<BackupItem> {
    names
        .iter()
        .map(|name| BackupItem::from_name(name, offset, now))
        .collect()
}

pub fn parse_backup_time(name: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(name, BACKUP_NAME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Relative description of `then` as seen from `now`.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let (span, suffix) = if delta < Duration::zero() {
        (-delta, "from now")
    } else {
        (delta, "ago")
    };
    match span.to_std() {
        Ok(span) if span.as_secs() >= 1 => format!("{} {suffix}", HumanDuration(span)),
        _ => "now".to_string(),
    }
}
