//! Utility functions for the CLI.

use bitcodec_core::{
    CancelToken, OperationKind, Outcome, ProgressSink, StreamConfig, run_reported, worker,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Result type shared by the command implementations.
pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Options shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Show the progress bar.
    pub progress: bool,
    /// Print the summary as JSON instead of the report text.
    pub json: bool,
    /// Cancel the operation after this long.
    pub time_limit: Option<Duration>,
}

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Split a progress message ("Label... 42%;\tTime elapsed: 1.00s") into its
/// label and percentage.
pub fn parse_progress(message: &str) -> Option<(&str, u64)> {
    let head = &message[..message.find("%;")?];
    let (label, percent) = head.rsplit_once(' ')?;
    Some((label, percent.parse().ok()?))
}

fn show_progress(pb: &ProgressBar, message: &str) {
    match parse_progress(message) {
        Some((label, percent)) => {
            pb.set_position(percent);
            pb.set_message(label.to_string());
        }
        None => pb.set_message(message.to_string()),
    }
}

/// Run `op` on a worker thread, drawing its progress until it finishes.
pub fn run_with_progress<T, F>(
    name: &str,
    opts: &RunOptions,
    op: F,
) -> Result<T, Box<dyn std::error::Error>>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken, &dyn ProgressSink) -> T + Send + 'static,
{
    let pb = create_progress_bar(100, opts.progress);
    let handle = worker::spawn(name, op)?;
    let result = handle.wait(opts.time_limit, |message| show_progress(&pb, message));
    pb.finish_and_clear();
    Ok(result?)
}

/// Print the outcome of an operation as a report string or JSON.
///
/// Failures are still reported through the operation guard (which writes
/// the dump file) and turned into an error for the exit status.
pub fn report<S>(
    kind: OperationKind,
    stream: &StreamConfig,
    result: bitcodec_core::Result<Outcome<S>>,
    json: bool,
) -> CliResult
where
    S: fmt::Display + Serialize,
{
    if json {
        if let Ok(outcome) = &result {
            let value = match outcome {
                Outcome::Completed(summary) => serde_json::to_value(summary)?,
                Outcome::Cancelled => serde_json::json!({ "cancelled": true }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }
    }

    let failed = result.is_err();
    let text = run_reported(kind, &stream.dump_dir, || result);
    if failed {
        return Err(text.into());
    }
    if text.is_empty() {
        eprintln!("Cancelled.");
    } else {
        println!("{}", text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress() {
        assert_eq!(
            parse_progress("Hamming-encoding... 42%;\tTime elapsed: 1.50s"),
            Some(("Hamming-encoding...", 42))
        );
        assert_eq!(
            parse_progress("Creating an encoding dictionary... 100%;\tTime elapsed: 0.01s"),
            Some(("Creating an encoding dictionary...", 100))
        );
        assert_eq!(parse_progress(""), None);
        assert_eq!(parse_progress("no percentage here"), None);
    }

    #[test]
    fn test_run_with_progress_returns_value() {
        let opts = RunOptions {
            progress: false,
            json: false,
            time_limit: None,
        };
        let value = run_with_progress("test-run", &opts, |_cancel, progress| {
            progress.update("Working... 50%;\tTime elapsed: 0.00s");
            7
        })
        .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_time_limit_cancels() {
        let opts = RunOptions {
            progress: false,
            json: false,
            time_limit: Some(Duration::from_millis(10)),
        };
        let cancelled = run_with_progress("test-limit", &opts, |cancel, _progress| {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(1));
            }
            true
        })
        .unwrap();
        assert!(cancelled);
    }

    #[test]
    fn test_report_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let stream = StreamConfig::default().with_dump_dir(dir.path());
        let result: bitcodec_core::Result<Outcome<String>> =
            Err(bitcodec_core::BitCodecError::invalid_parameter("boom"));
        let err = report(OperationKind::HAMMING_ENCODE, &stream, result, false).unwrap_err();
        assert!(err.to_string().starts_with("Encoding failed"));
        assert!(dir.path().join("hamming-encoder-error-dump.txt").exists());

        let ok: bitcodec_core::Result<Outcome<String>> = Ok(Outcome::Completed("done".into()));
        assert!(report(OperationKind::HAMMING_ENCODE, &stream, ok, true).is_ok());
    }
}
