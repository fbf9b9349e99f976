use crate::constants::MIN_SAVING_PERCENT;
use crate::failures::FailedFileRecord;
use crate::resolver::ImageFile;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The service could not shrink the file by at least one percent.
    BelowThreshold,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BelowThreshold => write!(f, "below threshold"),
        }
    }
}

/// Result of one compression attempt for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionOutcome {
    Compressed { saved_bytes: u64, percent: f64 },
    Skipped(SkipReason),
    Failed(String),
}

impl CompressionOutcome {
    pub fn is_compressed(&self) -> bool {
        matches!(self, CompressionOutcome::Compressed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CompressionOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CompressionOutcome::Failed(_))
    }
}

/// Size difference between an original file and the service's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Saving {
    pub original_size: u64,
    pub compressed_size: u64,
}

impl Saving {
    pub fn new(original_size: u64, compressed_size: u64) -> Self {
        Self {
            original_size,
            compressed_size,
        }
    }

    /// Bytes saved; negative when the output is larger than the original.
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.compressed_size as i64
    }

    pub fn percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.saved_bytes() as f64 * 100.0 / self.original_size as f64
    }

    /// Whether the saving reaches the replacement threshold.
    ///
    /// Compared in integers so that exactly one percent counts as worthwhile.
    pub fn is_worthwhile(&self) -> bool {
        if self.original_size == 0 {
            return false;
        }
        let saved = self.saved_bytes() as i128 * 100;
        saved >= self.original_size as i128 * MIN_SAVING_PERCENT as i128
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file: ImageFile,
    pub outcome: CompressionOutcome,
}

impl FileReport {
    pub fn new(file: ImageFile, outcome: CompressionOutcome) -> Self {
        Self { file, outcome }
    }
}

/// Everything a finished run has to say about itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub batches: usize,
    pub cooldowns: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_compressed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn saved_bytes(&self) -> u64 {
        self.reports
            .iter()
            .map(|r| match r.outcome {
                CompressionOutcome::Compressed { saved_bytes, .. } => saved_bytes,
                _ => 0,
            })
            .sum()
    }

    pub fn failed_records(&self) -> Vec<FailedFileRecord> {
        self.reports
            .iter()
            .filter_map(|r| match &r.outcome {
                CompressionOutcome::Failed(message) => {
                    Some(FailedFileRecord::new(r.file.path.clone(), message.clone()))
                }
                _ => None,
            })
            .collect()
    }
}
