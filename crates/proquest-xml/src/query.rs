//! Interactive query term collection
//!
//! Peripheral glue for the CLI: prompts for a comma-separated list of search
//! terms and reprompts until at least one term is entered. I/O is injected so
//! the concordance engine itself stays free of interactive state.

use std::io::{BufRead, Write};

use crate::error::{ProquestError, Result};

const PROMPT: &str = "Enter search terms, separated by commas: ";

/// Split a raw input line into trimmed, non-empty query terms.
pub fn parse_query_line(line: &str) -> Result<Vec<String>> {
    let terms: Vec<String> = line
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if terms.is_empty() {
        return Err(ProquestError::EmptyQuery);
    }
    Ok(terms)
}

/// Prompt on `output` and read query terms from `input`, reprompting while
/// the input is empty. Fails with [`ProquestError::EmptyQuery`] only when the
/// input stream ends without yielding any terms.
pub fn collect_query_terms<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>> {
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(ProquestError::EmptyQuery);
        }
        match parse_query_line(&line) {
            Ok(terms) => return Ok(terms),
            Err(ProquestError::EmptyQuery) => {
                writeln!(output, "No terms entered, please try again.")?;
            }
            Err(other) => return Err(other),
        }
    }
}

/// Collect query terms from stdin/stdout.
pub fn prompt_query_terms() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    collect_query_terms(&mut input, &mut output)
}
