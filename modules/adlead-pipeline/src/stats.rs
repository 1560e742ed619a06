use std::collections::BTreeMap;
use std::path::PathBuf;

/// Counts from one phase run, printed at the end of the run.
#[derive(Debug, Default)]
pub struct PhaseStats {
    pub phase: &'static str,
    pub input: usize,
    pub kept: usize,
    pub skipped: BTreeMap<&'static str, usize>,
    pub warnings: usize,
    pub output: Option<PathBuf>,
}

impl PhaseStats {
    pub fn new(phase: &'static str) -> Self {
        Self {
            phase,
            ..Default::default()
        }
    }

    pub fn record_skip(&mut self, reason: &'static str) {
        *self.skipped.entry(reason).or_default() += 1;
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

impl std::fmt::Display for PhaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== {} Complete ===", self.phase)?;
        writeln!(f, "Input rows:   {}", self.input)?;
        writeln!(f, "Kept:         {}", self.kept)?;
        writeln!(f, "Skipped:      {}", self.total_skipped())?;
        for (reason, count) in &self.skipped {
            writeln!(f, "  {reason:<17}{count}")?;
        }
        if self.warnings > 0 {
            writeln!(f, "Warnings:     {}", self.warnings)?;
        }
        match &self.output {
            Some(path) => write!(f, "Output:       {}", path.display()),
            None => write!(f, "Output:       <not written>"),
        }
    }
}
