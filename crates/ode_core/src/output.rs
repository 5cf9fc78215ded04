use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::traits::RowSink;

/// Writes the space-delimited text table: a header line, then one line per
/// sample with values in `f64`'s default `Display` form.
pub struct TableWriter<W: Write> {
    out: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowSink for TableWriter<W> {
    fn header(&mut self, columns: &[&str]) -> io::Result<()> {
        writeln!(self.out, "{}", columns.join(" "))
    }

    fn row(&mut self, values: &[f64]) -> io::Result<()> {
        let mut first = true;
        for value in values {
            if !first {
                write!(self.out, " ")?;
            }
            write!(self.out, "{value}")?;
            first = false;
        }
        writeln!(self.out)
    }
}

/// In-memory table of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of one column across all rows, if the column exists.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn last(&self) -> Option<&[f64]> {
        self.rows.last().map(Vec::as_slice)
    }
}

impl RowSink for Trajectory {
    fn header(&mut self, columns: &[&str]) -> io::Result<()> {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self.rows.clear();
        Ok(())
    }

    fn row(&mut self, values: &[f64]) -> io::Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_writer_formats_rows() {
        let mut writer = TableWriter::new(Vec::new());
        writer.header(&["t", "x", "y"]).expect("header");
        writer.row(&[0.0, 1.0, -2.5]).expect("row");
        writer.row(&[0.1, f64::NAN, f64::INFINITY]).expect("row");
        let text = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(text, "t x y\n0 1 -2.5\n0.1 NaN inf\n");
    }

    #[test]
    fn trajectory_exposes_columns() {
        let mut traj = Trajectory::new();
        traj.header(&["t", "y"]).expect("header");
        traj.row(&[0.0, 1.0]).expect("row");
        traj.row(&[0.5, 0.5]).expect("row");
        assert_eq!(traj.column("y"), Some(vec![1.0, 0.5]));
        assert_eq!(traj.column("z"), None);
        assert_eq!(traj.last(), Some(&[0.5, 0.5][..]));
    }
}
