//! File transport: messages saved as `.eml` files instead of delivered

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use super::{MailError, MailMessage};

/// Computes the file name for a message in file-transport mode
pub type FileNameCallback = Arc<dyn Fn(&MailMessage) -> String + Send + Sync>;

/// Default file names: `YYYYMMDD-HHMMSS-SSSS-RRRR.eml`
///
/// `SSSS` is the ten-thousandths of the current second and `RRRR` a random
/// number below 10000. Two consecutive names never match.
#[derive(Debug, Default)]
pub struct FileNameGenerator {
    last: Mutex<Option<String>>,
}

impl FileNameGenerator {
    /// Create a generator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for the current local time
    pub fn next_name(&self) -> String {
        self.name_at(Local::now())
    }

    /// Next name for `now`
    pub fn name_at(&self, now: DateTime<Local>) -> String {
        let stamp = format!(
            "{}-{:04}",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_micros() / 100
        );

        let mut rng = rand::thread_rng();
        let mut last = self.last.lock();
        let name = loop {
            let candidate = format!("{stamp}-{:04}.eml", rng.gen_range(0..10_000));
            if last.as_deref() != Some(candidate.as_str()) {
                break candidate;
            }
        };
        *last = Some(name.clone());
        name
    }
}

/// Write `message` to `dir/file_name`, creating `dir` as needed
///
/// Returns the path written.
pub(crate) async fn save_message(
    dir: &Path,
    file_name: &str,
    message: &MailMessage,
) -> Result<PathBuf, MailError> {
    let eml = message.to_eml()?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, eml).await?;
    debug!(path = %path.display(), "Saved message to file");

    Ok(path)
}
