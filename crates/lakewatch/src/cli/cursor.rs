//! Cursor maintenance commands

use crate::cli::output::summary_table;
use crate::config::ListingConfig;
use crate::listing::cursor::{CursorStore, FileCursorStore};
use chrono::{TimeZone, Utc};

#[derive(Debug)]
pub struct CursorArgs {
    pub config: ListingConfig,
}

/// Print the stored cursor state.
pub fn status(args: CursorArgs) -> anyhow::Result<()> {
    let store = FileCursorStore::new(args.config.cursor_path.clone(), args.config.fingerprint());
    let cursor = store.load()?;

    let watermark = if cursor.is_empty() {
        "none (next cycle lists everything)".to_string()
    } else {
        match Utc.timestamp_millis_opt(cursor.watermark_millis).single() {
            Some(dt) => format!("{} ({})", cursor.watermark_millis, dt.to_rfc3339()),
            None => cursor.watermark_millis.to_string(),
        }
    };

    let table = summary_table(&[
        ("Cursor file", store.path().display().to_string()),
        ("Watermark", watermark),
        (
            "Entries at watermark",
            cursor.emitted_at_watermark.len().to_string(),
        ),
    ]);
    println!("{table}");
    Ok(())
}

/// Discard the stored cursor.
pub fn reset(args: CursorArgs) -> anyhow::Result<()> {
    let mut store =
        FileCursorStore::new(args.config.cursor_path.clone(), args.config.fingerprint());
    store.reset()?;
    eprintln!("cursor reset, next scan lists everything");
    Ok(())
}
