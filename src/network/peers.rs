//! Peer list coordination
//!
//! [`PeerLists`] owns the recent and trusted peer lists together with the
//! pink list, and applies admission policy over them:
//! - private-range filtering (when configured)
//! - duplicate rejection
//! - pink-list eviction from the recent list on ban
//!
//! One service loop owns a `PeerLists`; it is not internally synchronised.

use crate::core::{Address, BoundedAddressSet, Rand16};
use crate::network::pinklist::PinkList;
use crate::network::policy::PolicyFlags;
use crate::storage::{Capacities, ListConfig, ListError, ListFile, ListStore};
use serde::Serialize;
use std::io;

/// Number of columns in a rendered peer grid
const GRID_COLUMNS: usize = 4;

/// Admission path: add `ip` to `set` unless it is the sentinel, a filtered
/// private address, or already present.
///
/// This is the only insertion path that applies the private-address filter.
pub fn admit(ip: Address, set: &mut BoundedAddressSet, policy: PolicyFlags) -> bool {
    if ip.is_empty() {
        return false;
    }
    if policy.private_rejected() && ip.is_private() {
        return false;
    }
    set.insert(ip)
}

/// Render the logical contents of `set` as a grid for display
pub fn render_grid(set: &BoundedAddressSet) -> String {
    let mut out = String::new();
    for (j, ip) in set.iter().enumerate() {
        if j % GRID_COLUMNS == 0 {
            out.push('\n');
        }
        out.push_str(&format!("   {:<15.15}", ip));
    }
    out.push_str("\n\n");
    out
}

/// Active peer lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Recent,
    Trusted,
}

impl From<ListKind> for ListFile {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Recent => ListFile::Recent,
            ListKind::Trusted => ListFile::Trusted,
        }
    }
}

/// Sizes of every list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeerListStats {
    pub recent: usize,
    pub trusted: usize,
    pub current_pink: usize,
    pub last_pink: usize,
    pub epoch_pink: usize,
}

/// Recent/trusted peer lists plus the pink list
#[derive(Debug, Clone)]
pub struct PeerLists {
    recent: BoundedAddressSet,
    trusted: BoundedAddressSet,
    pink: PinkList,
    policy: PolicyFlags,
}

impl PeerLists {
    /// Create empty lists sized from `caps`
    pub fn new(caps: &Capacities, policy: PolicyFlags) -> Self {
        let mut pink = PinkList::new(caps);
        pink.set_disabled(policy.ban_check_disabled());
        Self {
            recent: BoundedAddressSet::new(caps.recent),
            trusted: BoundedAddressSet::new(caps.trusted),
            pink,
            policy,
        }
    }

    /// Create empty lists whose epoch pink list is backed by the configured file
    pub fn from_config(config: &ListConfig, policy: PolicyFlags) -> Self {
        let mut lists = Self::new(&config.capacities, policy);
        lists.pink = lists
            .pink
            .with_epoch_file(config.path_for(ListFile::Epoch));
        lists
    }

    pub fn policy(&self) -> PolicyFlags {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PolicyFlags) {
        self.policy = policy;
        self.pink.set_disabled(policy.ban_check_disabled());
    }

    pub fn recent(&self) -> &BoundedAddressSet {
        &self.recent
    }

    pub fn trusted(&self) -> &BoundedAddressSet {
        &self.trusted
    }

    pub fn pink(&self) -> &PinkList {
        &self.pink
    }

    pub fn pink_mut(&mut self) -> &mut PinkList {
        &mut self.pink
    }

    pub fn list(&self, kind: ListKind) -> &BoundedAddressSet {
        match kind {
            ListKind::Recent => &self.recent,
            ListKind::Trusted => &self.trusted,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut BoundedAddressSet {
        match kind {
            ListKind::Recent => &mut self.recent,
            ListKind::Trusted => &mut self.trusted,
        }
    }

    /// Admit `ip` into a list. Pink-listed addresses are not checked here;
    /// see [`admit_peer`](Self::admit_peer).
    pub fn admit(&mut self, ip: Address, kind: ListKind) -> bool {
        let policy = self.policy;
        admit(ip, self.list_mut(kind), policy)
    }

    /// Admit a newly discovered peer, refusing pink-listed addresses
    pub fn admit_peer(&mut self, ip: Address, kind: ListKind) -> bool {
        if self.pink.is_banned(ip) {
            log::debug!("Refusing pink-listed peer {}", ip);
            return false;
        }
        self.admit(ip, kind)
    }

    pub fn is_banned(&self, ip: Address) -> bool {
        self.pink.is_banned(ip)
    }

    /// Report misbehaviour: pink-list `ip` and drop it from the recent list.
    ///
    /// Returns true if the address was newly pink-listed.
    pub fn ban(&mut self, ip: Address) -> bool {
        self.pink.ban(ip, &mut self.recent)
    }

    /// Epoch boundary hook
    pub fn roll_epoch(&mut self) {
        self.pink.roll_epoch();
    }

    /// Epoch window reset hook
    pub fn purge_epoch(&mut self) {
        self.pink.purge_epoch();
    }

    /// Shuffle a list before picking dial candidates
    pub fn shuffle<R: Rand16 + ?Sized>(&mut self, kind: ListKind, rng: &mut R) {
        let set = self.list_mut(kind);
        let len = set.capacity();
        set.shuffle(len, rng);
    }

    pub fn stats(&self) -> PeerListStats {
        PeerListStats {
            recent: self.recent.len(),
            trusted: self.trusted.len(),
            current_pink: self.pink.current().len(),
            last_pink: self.pink.last().len(),
            epoch_pink: self.pink.epoch().len(),
        }
    }

    /// Startup hook: read every list file the store knows about.
    ///
    /// Missing files are expected on a fresh node and are skipped. The trusted
    /// list falls back to the core peer list when it yields nothing.
    /// Returns the total number of addresses added.
    pub fn load_all(&mut self, store: &ListStore) -> usize {
        let policy = self.policy;

        let mut trusted = load_or_skip(store, ListFile::Trusted, &mut self.trusted, policy);
        if trusted == 0 {
            trusted = load_or_skip(store, ListFile::Core, &mut self.trusted, policy);
        }
        let recent = load_or_skip(store, ListFile::Recent, &mut self.recent, policy);
        let epoch = load_or_skip(store, ListFile::Epoch, self.pink.epoch_mut(), policy);

        log::info!(
            "Loaded peer lists: {} trusted, {} recent, {} epoch pink",
            trusted,
            recent,
            epoch
        );
        trusted + recent + epoch
    }

    /// Shutdown hook: write the recent, trusted and epoch pink lists.
    ///
    /// Every list is attempted; the first failure is returned.
    pub fn save_all(&self, store: &ListStore) -> Result<(), ListError> {
        let results = [
            store.save(ListFile::Recent, &self.recent),
            store.save(ListFile::Trusted, &self.trusted),
            store.save(ListFile::Epoch, self.pink.epoch()),
        ];
        results.into_iter().collect()
    }
}

fn load_or_skip(
    store: &ListStore,
    file: ListFile,
    set: &mut BoundedAddressSet,
    policy: PolicyFlags,
) -> usize {
    match store.load(file, set, policy) {
        Ok(count) => count,
        Err(ListError::OpenFailed { path, source }) if source.kind() == io::ErrorKind::NotFound => {
            log::debug!("No list file at {}", path.display());
            0
        }
        Err(e) => {
            log::warn!("{}", e);
            0
        }
    }
}
