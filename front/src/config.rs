use std::path::PathBuf;

use crate::session::SessionStore;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const APP_DIR: &str = "todoman";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub google_client_id: Option<String>,
    /// Remembered sessions.
    pub data_dir: PathBuf,
    /// Session-only sessions.
    pub runtime_dir: PathBuf,
}

impl Config {
    /// Fills in platform directories for anything not given.
    pub fn new(
        api_url: impl Into<String>,
        google_client_id: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let runtime_dir = (dirs::runtime_dir())
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);

        Self {
            api_url: api_url.into(),
            google_client_id: google_client_id.filter(|id| !id.trim().is_empty()),
            data_dir,
            runtime_dir,
        }
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::in_dirs(&self.data_dir, &self.runtime_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, None, None)
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR),
        None => PathBuf::from(format!(".{}", APP_DIR)),
    }
}
