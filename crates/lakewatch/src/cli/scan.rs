//! Scan command: run listing cycles against a local tree
//!
//! One cycle by default, or a polling loop with `--watch`. Records go
//! to stdout as JSON lines; the cycle summary goes to stderr so piped
//! output stays clean.

use crate::cli::output::summary_table;
use crate::config::{substitute, ListingConfig};
use crate::listing::cursor::FileCursorStore;
use crate::listing::orchestrator::Lister;
use crate::record::JsonLinesSink;
use crate::remote::LocalFs;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::error;

#[derive(Debug)]
pub struct ScanArgs {
    pub config: ListingConfig,
    /// Filesystem prefix remote paths resolve under.
    pub store_root: PathBuf,
    /// `name=value` pairs expanded into `${name}` references in the
    /// root path.
    pub vars: Vec<(String, String)>,
    pub watch: bool,
}

pub fn run(args: ScanArgs) -> anyhow::Result<()> {
    let mut config = args.config;
    let vars: HashMap<String, String> = args.vars.into_iter().collect();
    config.root_path = substitute(&config.root_path, &vars);
    config.validate()?;

    let store = FileCursorStore::new(config.cursor_path.clone(), config.fingerprint());
    let mut lister = Lister::new(&config, Box::new(store))?;
    let remote = LocalFs::new(&args.store_root);
    let mut sink = JsonLinesSink::new(io::stdout().lock());

    loop {
        match lister.run_cycle(&remote, &mut sink) {
            Ok(outcome) => {
                let watermark = outcome
                    .watermark_millis
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "none".to_string());
                let table = summary_table(&[
                    ("Files listed", outcome.stats.files_listed.to_string()),
                    ("Files emitted", outcome.stats.files_emitted.to_string()),
                    ("Duration (ms)", outcome.stats.duration_ms.to_string()),
                    ("Watermark", watermark),
                ]);
                eprintln!("{table}");
            }
            Err(e) if args.watch => {
                // Watch mode keeps going; the cursor was not advanced,
                // so the next cycle retries the same batch.
                error!(error = %e, "listing cycle failed");
            }
            Err(e) => return Err(e.into()),
        }

        if !args.watch {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(config.poll_interval_secs));
    }
}

/// Parse a `name=value` CLI variable.
pub fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_splits_on_first_equals() {
        assert_eq!(
            parse_var("env=prod").unwrap(),
            ("env".to_string(), "prod".to_string())
        );
        assert_eq!(
            parse_var("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_var("noequals").is_err());
        assert!(parse_var("=value").is_err());
    }
}
