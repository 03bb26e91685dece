//! Entropy command implementation.

use crate::config::CliConfig;
use crate::utils::{CliResult, RunOptions, run_with_progress};
use bitcodec_core::{Outcome, file_name};
use bitcodec_prefix::entropy;
use std::path::Path;

pub fn cmd_entropy(input: &Path, config: &CliConfig, opts: &RunOptions) -> CliResult {
    let path = input.to_path_buf();
    let stream = config.stream.clone();
    let outcome = run_with_progress("entropy", opts, move |cancel, progress| {
        entropy::from_file(&path, &stream, cancel, progress)
    })??;

    let Outcome::Completed(bits) = outcome else {
        eprintln!("Cancelled.");
        return Ok(());
    };
    if opts.json {
        let value = serde_json::json!({
            "file": file_name(input),
            "entropy": bits,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}: {:.6} bits per byte", file_name(input), bits);
    }
    Ok(())
}
