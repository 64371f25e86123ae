//! On-disk storage of the signed-in session.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use todoman_api::v1::User;

use crate::StoreError;

const SESSION_FILE: &str = "session.ron";

/// Bearer token and profile of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where a session is kept, chosen by "remember me" at sign-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Survives logouts of the desktop session and reboots.
    #[default]
    Remembered,
    /// Kept in the runtime directory, gone when the login session ends.
    SessionOnly,
}

impl Persistence {
    pub fn from_remember_me(remember_me: bool) -> Self {
        match remember_me {
            true => Self::Remembered,
            false => Self::SessionOnly,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    remembered: PathBuf,
    session_only: PathBuf,
}

impl SessionStore {
    pub fn new(remembered: impl Into<PathBuf>, session_only: impl Into<PathBuf>) -> Self {
        Self {
            remembered: remembered.into(),
            session_only: session_only.into(),
        }
    }

    /// Store with `session.ron` under each directory.
    pub fn in_dirs(data_dir: &Path, runtime_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE), runtime_dir.join(SESSION_FILE))
    }

    pub fn path(&self, persistence: Persistence) -> &Path {
        match persistence {
            Persistence::Remembered => &self.remembered,
            Persistence::SessionOnly => &self.session_only,
        }
    }

    /// Loads the stored session, preferring the remembered one.
    pub fn load(&self) -> Result<Option<(Session, Persistence)>, StoreError> {
        for persistence in [Persistence::Remembered, Persistence::SessionOnly] {
            if let Some(session) = read(self.path(persistence))? {
                return Ok(Some((session, persistence)));
            }
        }

        Ok(None)
    }

    /// Saves `session` to the location picked by `persistence` and removes
    /// any copy kept at the other one.
    pub fn save(&self, session: &Session, persistence: Persistence) -> Result<(), StoreError> {
        let other = match persistence {
            Persistence::Remembered => Persistence::SessionOnly,
            Persistence::SessionOnly => Persistence::Remembered,
        };

        write(self.path(persistence), session)?;
        remove(self.path(other))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        remove(&self.remembered)?;
        remove(&self.session_only)
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 { session: &'a Session },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { session: Session },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_owned(),
        source,
    }
}

fn read(path: &Path) -> Result<Option<Session>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_error(path)(err)),
    };

    let data: DataOwned = ron::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.to_owned(),
        source,
    })?;

    match data {
        DataOwned::V1 { session } => Ok(Some(session)),
    }
}

fn write(path: &Path, session: &Session) -> Result<(), StoreError> {
    let data = DataBorrowed::V1 { session };
    let text = ron::ser::to_string_pretty(&data, Default::default())?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_error(path))?;
    file.write_all(text.as_bytes()).map_err(io_error(path))?;

    Ok(())
}

fn remove(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_error(path)(err)),
    }
}
