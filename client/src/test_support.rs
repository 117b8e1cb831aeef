//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

pub mod session_dir {
    //! Temporary session directories with capability-scoped file access.
    //!
    //! Tests inspect and seed the on-disk session document through these
    //! helpers instead of calling `std::fs` directly.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};
    use tempfile::TempDir;

    use crate::domain::ports::SessionStoreError;
    use crate::outbound::store::{FileSessionStore, SESSION_FILE};

    /// Temporary directory removed on drop.
    pub struct SessionDir {
        temp: TempDir,
        dir: Dir,
    }

    impl SessionDir {
        /// Create a fresh empty directory.
        ///
        /// # Examples
        ///
        /// ```rust
        /// use remiseria_client::test_support::session_dir::SessionDir;
        ///
        /// let dir = SessionDir::new()?;
        /// assert_eq!(dir.read_document()?, None);
        /// # Ok::<(), std::io::Error>(())
        /// ```
        pub fn new() -> io::Result<Self> {
            let temp = tempfile::tempdir()?;
            let dir = Dir::open_ambient_dir(temp.path(), ambient_authority())?;
            Ok(Self { temp, dir })
        }

        /// Filesystem path of the directory.
        pub fn path(&self) -> &Path {
            self.temp.path()
        }

        /// Open a [`FileSessionStore`] rooted here.
        pub fn open_store(&self) -> Result<FileSessionStore, SessionStoreError> {
            FileSessionStore::open(self.temp.path())
        }

        /// Overwrite the session document with raw bytes.
        pub fn write_document(&self, contents: &[u8]) -> io::Result<()> {
            self.dir.write(SESSION_FILE, contents)
        }

        /// Raw session document, or `None` when absent.
        pub fn read_document(&self) -> io::Result<Option<String>> {
            match self.dir.read_to_string(SESSION_FILE) {
                Ok(contents) => Ok(Some(contents)),
                Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(error),
            }
        }

        /// Sorted names of every entry in the directory.
        pub fn entries(&self) -> io::Result<Vec<String>> {
            let mut names = self
                .dir
                .entries()?
                .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
                .collect::<io::Result<Vec<_>>>()?;
            names.sort();
            Ok(names)
        }
    }
}
