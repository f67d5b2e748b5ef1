//! Peer list persistence layer
//!
//! Lists are stored as plain text, one address per line, behind a fixed
//! comment preface. Saving always truncates and rewrites the whole file;
//! if any write fails the partial file is deleted rather than left behind.

use crate::core::{Address, BoundedAddressSet, Resolver, SystemResolver};
use crate::network::peers::admit;
use crate::network::PolicyFlags;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::config::{ListConfig, ListFile};

/// First line of every saved list
pub const LIST_PREFACE: &str = "# Peer list (built by node)\n";

/// Longest line prefix considered when reading a list, terminator included
const LINE_BUFFER_LEN: usize = 128;

/// Characters that separate tokens on a list line
const DELIMITERS: &[u8] = b" #\r\n\t";

/// Storage errors
#[derive(Error, Debug)]
pub enum ListError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to open {}: {source}", .path.display())]
    OpenFailed { path: PathBuf, source: io::Error },
    #[error("I/O error writing {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },
    #[error("I/O error reading {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },
}

// =============================================================================
// Save
// =============================================================================

/// Write the preface and every entry of `set` up to its first empty slot.
pub fn write_list<W: Write>(writer: &mut W, set: &BoundedAddressSet) -> io::Result<()> {
    writer.write_all(LIST_PREFACE.as_bytes())?;
    for ip in set.iter() {
        writeln!(writer, "{}", ip)?;
    }
    writer.flush()
}

/// Save `set` to `path`, replacing any previous contents.
pub fn save_list(path: &Path, set: &BoundedAddressSet) -> Result<(), ListError> {
    log::debug!("save_list({}): saving...", path.display());

    let file = fs::File::create(path).map_err(|source| {
        log::error!("save_list({}): open failed: {}", path.display(), source);
        ListError::OpenFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    write_or_discard(path, BufWriter::new(file), set)?;
    log::info!("save_list({}): {} peers saved", path.display(), set.len());
    Ok(())
}

/// Write through `writer`, deleting `path` if anything fails.
fn write_or_discard<W: Write>(
    path: &Path,
    mut writer: W,
    set: &BoundedAddressSet,
) -> Result<(), ListError> {
    let result = write_list(&mut writer, set);
    // Close the file before unlinking it
    drop(writer);

    if let Err(source) = result {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("save_list({}): failed to remove partial file: {}", path.display(), e);
        }
        log::error!("save_list({}): *** I/O error writing address line: {}", path.display(), source);
        return Err(ListError::WriteFailed {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

// =============================================================================
// Load
// =============================================================================

/// First token of a list line, or `None` if the line starts with a
/// delimiter or is blank.
fn first_token(line: &[u8]) -> Option<&str> {
    let token = line.split(|b| DELIMITERS.contains(b)).next()?;
    if token.is_empty() {
        return None;
    }
    std::str::from_utf8(token).ok()
}

/// Read the list file at `path` into `set` through the admission path.
///
/// Each line's first token may be dotted-decimal or a hostname. Tokens that
/// fail to resolve, duplicates and filtered private addresses are skipped
/// silently. A read error stops the scan but keeps what was already added.
///
/// Returns the number of addresses added.
pub fn load_list(
    path: &Path,
    set: &mut BoundedAddressSet,
    policy: PolicyFlags,
    resolver: &dyn Resolver,
) -> Result<usize, ListError> {
    log::debug!("load_list({}): reading...", path.display());

    if path.as_os_str().is_empty() {
        return Err(ListError::InvalidArgument("empty list file path".to_string()));
    }
    let file = fs::File::open(path).map_err(|source| ListError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(read_list(path, BufReader::new(file), set, policy, resolver))
}

/// Discard the rest of the current line, including its terminator.
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(());
            }
            None => {
                let n = available.len();
                reader.consume(n);
            }
        }
    }
}

/// Admit every address listed by `reader`. `path` only labels log output.
///
/// At most `LINE_BUFFER_LEN - 1` bytes of a line are buffered; the rest of
/// an overlong line is skipped.
fn read_list<R: BufRead>(
    path: &Path,
    mut reader: R,
    set: &mut BoundedAddressSet,
    policy: PolicyFlags,
    resolver: &dyn Resolver,
) -> usize {
    let limit = (LINE_BUFFER_LEN - 1) as u64;
    let mut buf = Vec::with_capacity(LINE_BUFFER_LEN);
    let mut count = 0;

    loop {
        buf.clear();
        let read = (&mut reader).take(limit).read_until(b'\n', &mut buf);
        let read = match read {
            Ok(n) if n as u64 == limit && buf.last() != Some(&b'\n') => {
                skip_line(&mut reader).map(|()| n)
            }
            other => other,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::error!("load_list({}): *** I/O error: {}", path.display(), e);
                break;
            }
        }

        let Some(token) = first_token(&buf) else {
            continue;
        };
        let Some(ip) = resolver.resolve(token) else {
            log::debug!("load_list({}): cannot resolve {}", path.display(), token);
            continue;
        };
        if admit(ip, set, policy) {
            log::debug!("load_list({}): added {}", path.display(), ip);
            count += 1;
        }
    }

    count
}

// =============================================================================
// List Store
// =============================================================================

/// Peer list file manager rooted at a data directory
pub struct ListStore {
    config: ListConfig,
    resolver: Box<dyn Resolver>,
}

impl ListStore {
    /// Create a store, creating the data directory if needed
    pub fn new(config: ListConfig) -> Result<Self, ListError> {
        Self::with_resolver(config, Box::new(SystemResolver))
    }

    /// Create a store that resolves list entries through `resolver`
    pub fn with_resolver(config: ListConfig, resolver: Box<dyn Resolver>) -> Result<Self, ListError> {
        fs::create_dir_all(&config.data_dir).map_err(|source| ListError::OpenFailed {
            path: config.data_dir.clone(),
            source,
        })?;
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn path(&self, file: ListFile) -> PathBuf {
        self.config.path_for(file)
    }

    pub fn exists(&self, file: ListFile) -> bool {
        self.path(file).exists()
    }

    pub fn save(&self, file: ListFile, set: &BoundedAddressSet) -> Result<(), ListError> {
        save_list(&self.path(file), set)
    }

    pub fn load(
        &self,
        file: ListFile,
        set: &mut BoundedAddressSet,
        policy: PolicyFlags,
    ) -> Result<usize, ListError> {
        load_list(&self.path(file), set, policy, self.resolver.as_ref())
    }

    /// Load an arbitrary list file, e.g. one handed over by an operator
    pub fn import(
        &self,
        path: &Path,
        set: &mut BoundedAddressSet,
        policy: PolicyFlags,
    ) -> Result<usize, ListError> {
        load_list(path, set, policy, self.resolver.as_ref())
    }

    pub fn resolve(&self, host: &str) -> Option<Address> {
        self.resolver.resolve(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Resolver that never touches the network
    struct StaticResolver(HashMap<&'static str, Address>);

    impl Resolver for StaticResolver {
        fn resolve(&self, host: &str) -> Option<Address> {
            host.parse::<Address>().ok().or_else(|| self.0.get(host).copied())
        }
    }

    fn no_dns() -> StaticResolver {
        StaticResolver(HashMap::new())
    }

    /// Writer that fails once `limit` bytes have been accepted
    struct FailingWriter {
        written: usize,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    fn set_of(cap: usize, ips: &[&str]) -> BoundedAddressSet {
        let mut set = BoundedAddressSet::new(cap);
        for ip in ips {
            set.insert(addr(ip));
        }
        set
    }

    #[test]
    fn test_write_list_format() {
        let set = set_of(4, &["1.2.3.4", "8.8.8.8"]);
        let mut out = Vec::new();
        write_list(&mut out, &set).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "# Peer list (built by node)\n1.2.3.4\n8.8.8.8\n"
        );
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.lst");
        let set = set_of(8, &["1.2.3.4", "5.6.7.8", "9.9.9.9"]);

        save_list(&path, &set).unwrap();

        let mut loaded = BoundedAddressSet::new(8);
        let count = load_list(&path, &mut loaded, PolicyFlags::empty(), &no_dns()).unwrap();
        assert_eq!(count, 3);

        let mut expected: Vec<_> = set.iter().collect();
        let mut actual: Vec<_> = loaded.iter().collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.lst");
        save_list(&path, &set_of(4, &["1.1.1.1", "2.2.2.2"])).unwrap();
        save_list(&path, &set_of(4, &["3.3.3.3"])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}3.3.3.3\n", LIST_PREFACE));
    }

    #[test]
    fn test_write_failure_deletes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.lst");
        fs::write(&path, "partial").unwrap();

        let set = set_of(4, &["1.2.3.4", "5.6.7.8"]);
        let writer = FailingWriter {
            written: 0,
            limit: LIST_PREFACE.len() + 4,
        };

        let result = write_or_discard(&path, writer, &set);
        assert!(matches!(result, Err(ListError::WriteFailed { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_into_missing_dir_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("recent.lst");
        let result = save_list(&path, &set_of(4, &["1.2.3.4"]));
        assert!(matches!(result, Err(ListError::OpenFailed { .. })));
    }

    #[test]
    fn test_load_empty_path_is_invalid() {
        let mut set = BoundedAddressSet::new(4);
        let result = load_list(Path::new(""), &mut set, PolicyFlags::empty(), &no_dns());
        assert!(matches!(result, Err(ListError::InvalidArgument(_))));
    }

    #[test]
    fn test_load_missing_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = BoundedAddressSet::new(4);
        let result = load_list(
            &dir.path().join("nope.lst"),
            &mut set,
            PolicyFlags::empty(),
            &no_dns(),
        );
        assert!(matches!(result, Err(ListError::OpenFailed { .. })));
    }

    #[test]
    fn test_load_tokenizing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peers.lst");
        fs::write(
            &path,
            "# comment line\n\
             1.2.3.4 trailing words\n\
             \n\
             \x20 5.5.5.5 indented lines are skipped\n\
             6.6.6.6#inline comment\r\n\
             7.7.7.7\tport\n\
             not-an-address\n\
             1.2.3.4\n\
             8.8.8.8",
        )
        .unwrap();

        let mut set = BoundedAddressSet::new(8);
        let count = load_list(&path, &mut set, PolicyFlags::empty(), &no_dns()).unwrap();

        assert_eq!(count, 4);
        assert!(set.contains(addr("1.2.3.4")));
        assert!(!set.contains(addr("5.5.5.5")));
        assert!(set.contains(addr("6.6.6.6")));
        assert!(set.contains(addr("7.7.7.7")));
        assert!(set.contains(addr("8.8.8.8")));
    }

    #[test]
    fn test_load_resolves_hostnames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.lst");
        fs::write(&path, "seed.example.net\nunknown.example.net\n").unwrap();

        let mut names = HashMap::new();
        names.insert("seed.example.net", addr("44.1.2.3"));
        let resolver = StaticResolver(names);

        let mut set = BoundedAddressSet::new(4);
        let count = load_list(&path, &mut set, PolicyFlags::empty(), &resolver).unwrap();
        assert_eq!(count, 1);
        assert!(set.contains(addr("44.1.2.3")));
    }

    #[test]
    fn test_load_filters_private_when_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peers.lst");
        fs::write(&path, "10.0.0.1\n192.168.1.1\n8.8.8.8\n").unwrap();

        let mut set = BoundedAddressSet::new(4);
        let count = load_list(&path, &mut set, PolicyFlags::NO_PRIVATE, &no_dns()).unwrap();
        assert_eq!(count, 1);
        assert!(set.contains(addr("8.8.8.8")));

        let mut open = BoundedAddressSet::new(4);
        let count = load_list(&path, &mut open, PolicyFlags::empty(), &no_dns()).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_load_long_line_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peers.lst");
        let long = format!("{}\n4.4.4.4 {}\n", "x".repeat(300), "y".repeat(300));
        fs::write(&path, long).unwrap();

        let mut set = BoundedAddressSet::new(4);
        let count = load_list(&path, &mut set, PolicyFlags::empty(), &no_dns()).unwrap();
        assert_eq!(count, 1);
        assert!(set.contains(addr("4.4.4.4")));
    }

    #[test]
    fn test_read_list_huge_line_stays_bounded() {
        // 64 MiB without a newline, then two ordinary entries
        let huge = io::repeat(b'x').take(64 * 1024 * 1024);
        let tail = io::Cursor::new(b"\n5.5.5.5\n6.6.6.6".to_vec());
        let reader = BufReader::new(huge.chain(tail));

        let mut set = BoundedAddressSet::new(4);
        let count = read_list(
            Path::new("huge.lst"),
            reader,
            &mut set,
            PolicyFlags::empty(),
            &no_dns(),
        );
        assert_eq!(count, 2);
        assert!(set.contains(addr("5.5.5.5")));
        assert!(set.contains(addr("6.6.6.6")));
    }

    #[test]
    fn test_read_list_overlong_line_keeps_token() {
        let text = format!("7.7.7.7{}\n8.8.8.8\n", " ".repeat(LINE_BUFFER_LEN * 3));
        let mut set = BoundedAddressSet::new(4);
        let count = read_list(
            Path::new("mem.lst"),
            io::Cursor::new(text.into_bytes()),
            &mut set,
            PolicyFlags::empty(),
            &no_dns(),
        );
        assert_eq!(count, 2);
        assert!(set.contains(addr("7.7.7.7")));
        assert!(set.contains(addr("8.8.8.8")));
    }

    #[test]
    fn test_store_paths_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = ListConfig::with_data_dir(dir.path().join("data"));
        let store = ListStore::with_resolver(config, Box::new(no_dns())).unwrap();

        assert!(!store.exists(ListFile::Trusted));
        store
            .save(ListFile::Trusted, &set_of(4, &["9.8.7.6"]))
            .unwrap();
        assert!(store.exists(ListFile::Trusted));

        let mut set = BoundedAddressSet::new(4);
        let count = store
            .load(ListFile::Trusted, &mut set, PolicyFlags::empty())
            .unwrap();
        assert_eq!(count, 1);
        assert!(set.contains(addr("9.8.7.6")));
    }
}
