pub mod constants;
pub mod timestamp;
pub mod url_utils;

pub use constants::*;
pub use timestamp::{epoch_millis, file_timestamp};
pub use url_utils::{is_valid_url, normalize_url, photo_id_from_url};
