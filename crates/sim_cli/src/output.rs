//! Terminal result printing (§6.3): one JSON document to the given writer,
//! pretty-printed so a human tailing the run can read it directly.

use std::io::Write;

use sim_core::results::Results;
use sim_core::sequence::SequenceRow;

use crate::error::CliError;

pub fn write_results<W: Write>(writer: &mut W, results: &Results) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(results).expect("Results always serializes to JSON");
    writeln!(writer, "{json}").map_err(CliError::Output)
}

pub fn write_sequence<W: Write>(writer: &mut W, rows: &[SequenceRow]) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(rows).expect("SequenceRow always serializes to JSON");
    writeln!(writer, "{json}").map_err(CliError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::history::History;

    #[test]
    fn writes_results_as_valid_json() {
        let history = History::new(5, 5);
        let results = Results::from_history(&history, 0);
        let mut buffer = Vec::new();
        write_results(&mut buffer, &results).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(parsed.get("version").is_some());
    }

    #[test]
    fn writes_an_empty_sequence_as_an_empty_array() {
        let mut buffer = Vec::new();
        write_sequence(&mut buffer, &[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(parsed.as_array().unwrap().is_empty());
    }
}
