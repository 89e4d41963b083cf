//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use chrono::{Local, TimeZone};
use image::{ImageBuffer, ImageFormat, Rgb};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Set a file's modification time to noon local time on the given day
pub fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
    let noon = Local.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(noon.into())
        .unwrap();
}

/// Write a real image of the given size, modified on 2024-08-05.
/// `seed` varies the pixels so different seeds give different bytes.
pub fn write_image(child: &ChildPath, width: u32, height: u32, seed: u8) -> PathBuf {
    let path = child.path().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let format = ImageFormat::from_path(&path).unwrap();
    let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, seed])
    });
    buffer.save_with_format(&path, format).unwrap();
    set_mtime(&path, 2024, 8, 5);
    path
}

/// Write a plain file modified on 2024-08-05
pub fn write_file(child: &ChildPath, content: &[u8]) -> PathBuf {
    child.write_binary(content).unwrap();
    set_mtime(child.path(), 2024, 8, 5);
    child.path().to_path_buf()
}

/// Number of regular files directly inside `dir`
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}
