use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use crate::config;
use crate::logging;

pub fn run(lines: usize) -> Result<()> {
    let files = logging::log_files();

    let Some(path) = files.last() else {
        println!("No log files found in {:?}", config::runtime_dir());
        println!("Log files are written by `wattlog session --interactive`.");
        return Ok(());
    };

    for line in tail(path, lines)? {
        println!("{}", line);
    }

    Ok(())
}

fn tail(path: &Path, lines: usize) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read log file {}", path.display()))?;

    let all: Vec<&str> = contents.lines().collect();
    let start = all.len().saturating_sub(lines);
    Ok(all[start..].iter().map(|l| l.to_string()).collect())
}
