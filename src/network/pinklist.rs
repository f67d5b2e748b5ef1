//! Pink list: tiered ban list for misbehaving peers
//!
//! Three independently bounded rings make up the ban policy:
//! - Current: addresses banned during the active epoch
//! - Last: addresses carried over from previous epochs
//! - Epoch: addresses banned in the long-lived epoch window, persisted
//!   to disk and erased with [`PinkList::purge_epoch`]
//!
//! An address is banned while it sits in any tier. There is no explicit
//! unban: entries expire only when their ring slot is reused or the epoch
//! tier is purged.

use crate::core::{Address, BoundedAddressSet};
use crate::storage::Capacities;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tiered ban list
#[derive(Debug, Clone)]
pub struct PinkList {
    current: BoundedAddressSet,
    last: BoundedAddressSet,
    epoch: BoundedAddressSet,
    /// Backing file of the epoch tier, removed on purge
    epoch_file: Option<PathBuf>,
    /// Suppresses every ban check when set
    disabled: bool,
}

impl PinkList {
    /// Create empty tiers sized from `caps`
    pub fn new(caps: &Capacities) -> Self {
        Self {
            current: BoundedAddressSet::new(caps.current_pink),
            last: BoundedAddressSet::new(caps.last_pink),
            epoch: BoundedAddressSet::new(caps.epoch_pink),
            epoch_file: None,
            disabled: false,
        }
    }

    /// Attach the file the epoch tier is persisted to
    pub fn with_epoch_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.epoch_file = Some(path.into());
        self
    }

    pub fn epoch_file(&self) -> Option<&Path> {
        self.epoch_file.as_deref()
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn current(&self) -> &BoundedAddressSet {
        &self.current
    }

    pub fn last(&self) -> &BoundedAddressSet {
        &self.last
    }

    pub fn epoch(&self) -> &BoundedAddressSet {
        &self.epoch
    }

    /// Mutable epoch tier, for loading it from disk
    pub fn epoch_mut(&mut self) -> &mut BoundedAddressSet {
        &mut self.epoch
    }

    /// Check whether `ip` is on any tier
    pub fn is_banned(&self, ip: Address) -> bool {
        if self.disabled {
            return false;
        }
        self.current.contains(ip) || self.last.contains(ip) || self.epoch.contains(ip)
    }

    /// Append to the current tier. Callers check [`is_banned`](Self::is_banned)
    /// first if they want to avoid duplicates.
    pub fn add_current(&mut self, ip: Address) {
        self.current.push(ip);
    }

    /// Append to the last tier. No duplicate check.
    pub fn add_last(&mut self, ip: Address) {
        self.last.push(ip);
    }

    /// Append to the epoch tier. No duplicate check.
    pub fn add_epoch(&mut self, ip: Address) {
        if self.epoch.will_wrap() {
            log::debug!("Epoch pink list overflow");
        }
        self.epoch.push(ip);
    }

    /// Pink-list `ip` and evict it from the recent peer list.
    ///
    /// Returns true if the address was newly added to the current tier.
    pub fn ban(&mut self, ip: Address, recent: &mut BoundedAddressSet) -> bool {
        log::debug!("{} pink-listed", ip);

        let added = if self.is_banned(ip) {
            false
        } else {
            self.add_current(ip);
            true
        };
        if !self.disabled {
            recent.remove(ip);
        }
        added
    }

    /// Merge the current tier into the last tier and empty it.
    ///
    /// Call after each epoch.
    pub fn roll_epoch(&mut self) {
        // Empty slots may sit anywhere after removals, so walk every slot
        for &ip in self.current.as_slice() {
            if ip.is_empty() {
                continue;
            }
            if !self.last.contains(ip) {
                self.last.push(ip);
            }
        }
        self.current.clear();
    }

    /// Erase the epoch tier and its backing file
    pub fn purge_epoch(&mut self) {
        log::debug!("Purging epoch pink list");

        if let Some(path) = &self.epoch_file {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        self.epoch.clear();
    }
}
