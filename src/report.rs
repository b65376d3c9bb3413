//! Plain-text report sink for ranked results.

use std::io::{self, Write};

use crate::search::ResultSet;

/// Writes the ranked table as tab-separated lines.
///
/// The header names the columns: `error`, the result-formula label, then
/// one column per variable in canonical order. Error and result are printed
/// as raw floats; variable values are rounded to the nearest integer for
/// display only (they are standard series values, so the fraction is
/// noise). Ranking always used the unrounded values.
pub fn write_report<W: Write>(out: &mut W, label: &str, results: &ResultSet) -> io::Result<()> {
    write!(out, "error\t{}", label)?;
    for name in results.variables() {
        write!(out, "\t{}", name)?;
    }
    writeln!(out)?;

    for candidate in results.iter() {
        write!(out, "{}\t{}", candidate.error, candidate.result)?;
        for value in candidate.values() {
            write!(out, "\t{}", value.round() as i64)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Search;

    #[test]
    fn header_then_rounded_rows() {
        let mut search = Search::new("abs(x-4)", "x*2", &[]).unwrap();
        search.set_grid("x", vec![4.4, 1.0]).unwrap();
        let results = search.run().unwrap();

        let mut out = Vec::new();
        write_report(&mut out, "x*2", &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "error\tx*2\tx");
        // 4.4 misses the target by 0.4 and rounds to 4 for display.
        assert_eq!(lines[1], format!("{}\t{}\t4", 4.4f64 - 4.0, 8.8f64));
        assert_eq!(lines[2], "3\t2\t1");
        assert_eq!(lines.len(), 3);
    }
}
