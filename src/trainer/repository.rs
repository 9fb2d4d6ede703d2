use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::trainer::{models::Protocol, parser::parse_protocol_file};

/// File extension of protocol documents.
pub const PROTOCOL_EXTENSION: &str = "md";

/// All loaded protocols keyed by display name.
///
/// Read-only once loaded; engines borrow it for the duration of play.
#[derive(Debug, Clone, Default)]
pub struct ProtocolRepository {
    protocols: BTreeMap<String, Protocol>,
}

impl ProtocolRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `*.md` file directly inside `dir`.
    ///
    /// A missing or unreadable directory yields an empty repository, and a
    /// file that cannot be read is skipped. Files are visited in path order;
    /// when two declare the same name the later one wins.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut repo = Self::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot read protocol directory {}: {err}", dir.display());
                return repo;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == PROTOCOL_EXTENSION))
            .collect();
        paths.sort();

        for path in paths {
            match parse_protocol_file(&path) {
                Ok(protocol) => {
                    if let Some(old) = repo.insert(protocol) {
                        warn!(
                            "protocol {:?} from {} replaces an earlier file with the same name",
                            old.name(),
                            path.display()
                        );
                    }
                }
                Err(err) => warn!("skipping protocol file: {err}"),
            }
        }

        info!("loaded {} protocol(s) from {}", repo.len(), dir.display());
        repo
    }

    /// Add a protocol under its own name, returning any protocol it replaced.
    pub fn insert(&mut self, protocol: Protocol) -> Option<Protocol> {
        self.protocols.insert(protocol.name().to_string(), protocol)
    }

    pub fn get(&self, name: &str) -> Option<&Protocol> {
        self.protocols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.protocols.contains_key(name)
    }

    /// Protocol names in sorted order, for a selection list.
    pub fn names(&self) -> Vec<&str> {
        self.protocols.keys().map(String::as_str).collect()
    }

    pub fn protocols(&self) -> &BTreeMap<String, Protocol> {
        &self.protocols
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

impl FromIterator<Protocol> for ProtocolRepository {
    fn from_iter<I: IntoIterator<Item = Protocol>>(iter: I) -> Self {
        let mut repo = Self::new();
        for protocol in iter {
            repo.insert(protocol);
        }
        repo
    }
}
