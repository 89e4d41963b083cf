//! Date buckets for the primary area.

use super::types::FolderStructure;
use chrono::{DateTime, Datelike, Local};
use std::fs::Metadata;
use std::path::PathBuf;

/// Year/month (and day) a file is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBucket {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Maps timestamps to destination sub-folders
#[derive(Debug, Clone, Copy, Default)]
pub struct DateBucketer {
    structure: FolderStructure,
}

impl DateBucketer {
    pub fn new(structure: FolderStructure) -> Self {
        Self { structure }
    }

    pub fn bucket(&self, timestamp: DateTime<Local>) -> DateBucket {
        DateBucket {
            year: timestamp.year(),
            month: timestamp.month(),
            day: timestamp.day(),
        }
    }

    /// Folder relative to the album root, e.g. `2024/08`
    pub fn subdir(&self, timestamp: DateTime<Local>) -> PathBuf {
        let bucket = self.bucket(timestamp);
        let year = PathBuf::from(bucket.year.to_string());

        match self.structure {
            FolderStructure::YearMonth => year.join(format!("{:02}", bucket.month)),
            FolderStructure::YearMonthNamed => {
                year.join(format!("{:02}-{}", bucket.month, month_name(bucket.month)))
            }
            FolderStructure::YearMonthDay => year
                .join(format!("{:02}", bucket.month))
                .join(format!("{:02}", bucket.day)),
        }
    }

    /// Last-modified time of a file, or now when the platform cannot tell.
    /// This is a best-effort date, not the capture time.
    pub fn timestamp_of(metadata: &Metadata) -> DateTime<Local> {
        metadata
            .modified()
            .map(DateTime::<Local>::from)
            .unwrap_or_else(|_| Local::now())
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
