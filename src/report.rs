//! Fixed-width summary table.

use std::io::{self, Write};

use crate::gitlab::types::Summary;

/// Receives the report header and one row per project.
pub trait SummaryPrinter {
  fn header(&mut self) -> io::Result<()>;
  fn row(&mut self, summary: &Summary) -> io::Result<()>;
}

/// Writes aligned columns: name, opened, merged, closed, all.
pub struct TablePrinter<W: Write> {
  out: W,
}

impl<W: Write> TablePrinter<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  #[cfg(test)]
  pub fn into_inner(self) -> W {
    self.out
  }

  fn line(
    &mut self,
    name: &str,
    opened: &dyn std::fmt::Display,
    merged: &dyn std::fmt::Display,
    closed: &dyn std::fmt::Display,
    all: &dyn std::fmt::Display,
  ) -> io::Result<()> {
    writeln!(
      self.out,
      "{:>30} | {:>6} | {:>6} | {:>6} |{:>6}",
      name, opened, merged, closed, all
    )
  }
}

impl<W: Write> SummaryPrinter for TablePrinter<W> {
  fn header(&mut self) -> io::Result<()> {
    self.line("Project Name", &"Opened", &"Merged", &"Closed", &"All")
  }

  fn row(&mut self, summary: &Summary) -> io::Result<()> {
    let counts = &summary.counts;
    self.line(
      &summary.name,
      &counts.opened,
      &counts.merged,
      &counts.closed,
      &summary.total,
    )?;
    self.out.flush()
  }
}
