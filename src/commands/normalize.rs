//! Normalize command implementation.

use anyhow::Result;

use crate::normalizer::normalize;

/// Run the normalize command: show how each line would be canonicalized
pub async fn run(lines: &[String]) -> Result<()> {
    println!();
    for line in lines {
        println!("{}", describe(line));
    }
    println!();
    Ok(())
}

/// One report line per input
pub fn describe(line: &str) -> String {
    match normalize(line) {
        Some(address) => format!("{:?} -> {}", line, address),
        None => format!("{:?} -> rejected", line),
    }
}
