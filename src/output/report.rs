//! Word count CSV report
//!
//! Writes the frequency table as a two-column `Word,Count` CSV, most
//! frequent word first.

use crate::output::{OutputResult, WordCounts};
use std::io::Write;
use std::path::Path;

const CSV_HEADERS: [&str; 2] = ["Word", "Count"];

/// Writes the word counts as CSV to any writer
pub fn write_word_counts<W: Write>(counts: &WordCounts, writer: W) -> OutputResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADERS)?;

    for (word, count) in counts.iter() {
        writer.write_record([word, count.to_string().as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the word counts to a CSV file, replacing it if it exists
///
/// # Arguments
///
/// * `counts` - The word frequency table
/// * `output_path` - Path where the CSV file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to create or write the file
pub fn write_word_counts_csv(counts: &WordCounts, output_path: &Path) -> OutputResult<()> {
    let file = std::fs::File::create(output_path)?;
    write_word_counts(counts, file)
}
