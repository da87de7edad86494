//! Resolution of what gets uploaded
//!
//! A run uploads exactly one file: the path given on the command line, a zip
//! archive of it when it is a directory, or a copy of standard input when no
//! path is given. Generated files live in the temp directory and are removed
//! once the [`ResolvedInput`] is dropped unless asked to keep them.

use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Size of the buffer standard input is copied through
pub const STDIN_CHUNK_SIZE: usize = 4096;

/// Number of random bytes in generated file names
const RANDOM_NAME_BYTES: usize = 16;

/// Returns 16 random bytes as 32 lowercase hex characters
pub fn random_hex() -> String {
    let bytes: [u8; RANDOM_NAME_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Last path segment of `path`, as sent to Slack
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Where the upload content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A regular file given on the command line
    File,
    /// A directory zipped into a temporary archive
    Archive,
    /// Standard input buffered into a temporary file
    Stdin,
}

/// The file chosen for upload, opened for reading
#[derive(Debug)]
pub struct ResolvedInput {
    path: PathBuf,
    kind: InputKind,
    file: File,
    // Declared after `file` so the handle is closed before the file is removed
    artifact: Option<TempPath>,
}

impl ResolvedInput {
    /// Path of the file that will be uploaded
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// File name sent along with the content
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }

    /// Whether the file is removed when this value is dropped
    pub fn is_temporary(&self) -> bool {
        self.artifact.is_some()
    }

    /// Open handle on the file
    pub fn file(&mut self) -> &mut File {
        &mut self.file
    }

    /// Reads the whole file
    pub fn read_content(&mut self) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        self.file.rewind()?;
        self.file.read_to_end(&mut content)?;
        Ok(content)
    }
}

/// Decides which file a run uploads
#[derive(Debug, Clone)]
pub struct InputResolver {
    temp_dir: PathBuf,
    keep_temp: bool,
}

impl Default for InputResolver {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl InputResolver {
    /// Creates a resolver writing generated files to `temp_dir`
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            keep_temp: false,
        }
    }

    /// Keeps generated files after the run instead of removing them
    pub fn keep_temp(mut self, keep: bool) -> Self {
        self.keep_temp = keep;
        self
    }

    /// Resolves the upload source
    ///
    /// # Arguments
    ///
    /// * `file` - Path from the command line, `None` to read `stdin`
    /// * `stdin` - Reader used when no path is given
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Reading stdin or writing its copy fails
    /// - The path does not exist or cannot be opened
    /// - Archiving a directory fails
    pub fn resolve(&self, file: Option<&Path>, stdin: impl Read) -> Result<ResolvedInput> {
        let (path, kind, artifact) = match file {
            None => {
                let (path, artifact) = self.buffer_stdin(stdin)?;
                (path, InputKind::Stdin, Some(artifact))
            }
            Some(path) => {
                let metadata = fs::metadata(path).map_err(|e| not_found_or_io(path, e))?;
                if metadata.is_dir() {
                    let (archive, artifact) = self.archive_directory(path)?;
                    (archive, InputKind::Archive, Some(artifact))
                } else {
                    (path.to_path_buf(), InputKind::File, None)
                }
            }
        };

        let artifact = match artifact {
            Some(artifact) if self.keep_temp => {
                let kept = artifact.keep().map_err(|e| Error::Io(e.error))?;
                info!("Keeping generated file {}", kept.display());
                None
            }
            other => other,
        };

        let opened = File::open(&path).map_err(|e| not_found_or_io(&path, e))?;
        debug!("Resolved upload source {} ({:?})", path.display(), kind);

        Ok(ResolvedInput {
            path,
            kind,
            file: opened,
            artifact,
        })
    }

    /// Copies `stdin` into a new file named with a random hex token
    fn buffer_stdin(&self, mut stdin: impl Read) -> Result<(PathBuf, TempPath)> {
        let path = self.temp_dir.join(random_hex());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        let artifact = TempPath::try_from_path(&path)?;

        let mut writer = BufWriter::new(file);
        let mut buffer = [0u8; STDIN_CHUNK_SIZE];
        let mut total = 0usize;
        loop {
            let read = match stdin.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            writer.write_all(&buffer[..read])?;
            total += read;
        }
        writer.flush()?;

        info!("Buffered {} bytes of stdin into {}", total, path.display());
        Ok((path, artifact))
    }

    /// Zips `dir` into `<dir-name>-<random hex>.zip`
    fn archive_directory(&self, dir: &Path) -> Result<(PathBuf, TempPath)> {
        let root = fs::canonicalize(dir).map_err(|e| not_found_or_io(dir, e))?;
        let base_name = archive_base_name(&root);
        let archive_path = self
            .temp_dir
            .join(format!("{}-{}.zip", base_name, random_hex()));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&archive_path)?;
        let artifact = TempPath::try_from_path(&archive_path)?;

        // The archive itself shows up in the walk when `dir` holds the temp dir
        let own_path = fs::canonicalize(&archive_path)?;
        let entries = build_zip_archive(&root, &base_name, file, Some(own_path.as_path()))?;
        info!(
            "Archived {} ({} entries) into {}",
            dir.display(),
            entries,
            archive_path.display()
        );

        Ok((archive_path, artifact))
    }
}

fn not_found_or_io(path: &Path, error: io::Error) -> Error {
    match error.kind() {
        io::ErrorKind::NotFound => Error::file_not_found(path),
        _ => Error::Io(error),
    }
}

/// Name of the canonical directory, `root` for `/`
fn archive_base_name(canonical: &Path) -> String {
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

/// Writes every file and directory under `dir` into a zip archive
///
/// Entries are stored below a top-level folder named `root_name`, so
/// extracting the archive recreates the directory itself. Returns the number
/// of entries written. `skip` names a file left out of the archive.
fn build_zip_archive<W: Write + Seek>(
    dir: &Path,
    root_name: &str,
    file: W,
    skip: Option<&Path>,
) -> Result<usize> {
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    let mut count = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::archive(dir, e))?;
        if skip == Some(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::archive(dir, e))?;

        let Some(name) = entry_name(root_name, relative) else {
            warn!(
                "File {} contains non-unicode symbols in path, skipping",
                entry.path().display()
            );
            continue;
        };

        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| Error::archive(dir, e))?;
        } else if entry.file_type().is_file() {
            writer
                .start_file(name, options)
                .map_err(|e| Error::archive(dir, e))?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut writer)?;
        } else {
            debug!("Skipping special file {}", entry.path().display());
            continue;
        }
        count += 1;
    }

    writer.finish().map_err(|e| Error::archive(dir, e))?;
    Ok(count)
}

/// Zip entry name with `/` separators, `None` for non-unicode paths
fn entry_name(root_name: &str, relative: &Path) -> Option<String> {
    let mut name = root_name.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(part.to_str()?);
        }
    }
    Some(name)
}
