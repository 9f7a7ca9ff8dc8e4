//! Persistence of crawl output: downloaded images and JSON artifacts.

pub mod image_downloader;
pub mod json_saver;

pub use image_downloader::{HttpDownloader, ImageDownloader};
pub use json_saver::{ensure_dir, export_work_log, save_json_file};
