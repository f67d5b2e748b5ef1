//! CLI commands for the peer lists
//!
//! Implements all command handlers for the CLI interface. Every command
//! loads the lists from the data directory, applies one operation and
//! writes back what it changed.

use crate::core::{Address, BoundedAddressSet};
use crate::network::{render_grid, ListKind, PeerLists, PolicyFlags};
use crate::storage::{ListConfig, ListFile, ListStore, CONFIG_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub lists: PeerLists,
    pub store: ListStore,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize application state and load every list file
    pub fn new(data_dir: PathBuf, policy: PolicyFlags) -> CliResult<Self> {
        fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            log::debug!("Using configuration from {}", config_path.display());
            ListConfig::from_file(&config_path)?
        } else {
            ListConfig::default()
        };
        config.data_dir = data_dir.clone();

        let store = ListStore::new(config.clone())?;
        // Saved lists are rewritten by every command, so read them back in
        // full; the private filter only applies to newly admitted addresses
        let mut lists = PeerLists::from_config(&config, policy - PolicyFlags::NO_PRIVATE);
        lists.load_all(&store);
        lists.set_policy(policy);

        Ok(Self {
            lists,
            store,
            data_dir,
        })
    }

    /// Save every list
    pub fn save(&self) -> CliResult<()> {
        self.lists.save_all(&self.store)?;
        Ok(())
    }

    /// Resolve an operator-supplied address or hostname
    fn resolve(&self, host: &str) -> CliResult<Address> {
        match self.store.resolve(host) {
            Some(ip) if !ip.is_empty() => Ok(ip),
            _ => Err(format!("cannot resolve address: {}", host).into()),
        }
    }
}

/// Show a list and the list sizes
pub fn cmd_show(state: &AppState, file: ListFile, json: bool) -> CliResult<()> {
    let stats = state.lists.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let core;
    let (title, set) = match file {
        ListFile::Recent => ("Recent peers", state.lists.recent()),
        ListFile::Trusted => ("Trusted peers", state.lists.trusted()),
        ListFile::Epoch => ("Epoch pink list", state.lists.pink().epoch()),
        ListFile::Core => {
            core = load_core(state)?;
            ("Core peers", &core)
        }
    };

    println!("📋 {} ({}/{})", title, set.len(), set.capacity());
    print!("{}", render_grid(set));

    println!("📊 Peer lists");
    println!("   ├─ Recent: {}", stats.recent);
    println!("   ├─ Trusted: {}", stats.trusted);
    println!("   └─ Epoch pink: {}", stats.epoch_pink);

    Ok(())
}

/// The core list is read-only and not part of the loaded state
fn load_core(state: &AppState) -> CliResult<BoundedAddressSet> {
    let mut set = BoundedAddressSet::new(state.store.config().capacities.trusted);
    state
        .store
        .load(ListFile::Core, &mut set, state.lists.policy())?;
    Ok(set)
}

/// Admit an address into a list
pub fn cmd_add(state: &mut AppState, host: &str, kind: ListKind) -> CliResult<()> {
    let ip = state.resolve(host)?;

    if state.lists.is_banned(ip) {
        println!("⛔ {} is pink-listed, not added", ip);
        return Ok(());
    }
    if !state.lists.admit_peer(ip, kind) {
        println!("⚠️  {} not added ({}, or already listed)", ip, ip.classify());
        return Ok(());
    }

    state.store.save(kind.into(), state.lists.list(kind))?;
    println!("✅ Added {} to {:?} list", ip, kind);
    Ok(())
}

/// Pink-list an address and evict it from the recent list
pub fn cmd_ban(state: &mut AppState, host: &str) -> CliResult<()> {
    let ip = state.resolve(host)?;

    let added = state.lists.ban(ip);
    // Only the epoch tier outlives this process
    let pink = state.lists.pink_mut();
    if !pink.epoch().contains(ip) {
        pink.add_epoch(ip);
    }

    state.save()?;

    if added {
        println!("⛔ {} pink-listed", ip);
    } else {
        println!("⛔ {} was already pink-listed", ip);
    }
    Ok(())
}

/// Report the classification and ban status of an address
pub fn cmd_check(state: &AppState, host: &str) -> CliResult<()> {
    let ip = state.resolve(host)?;

    println!("🔍 {}", ip);
    println!("   ├─ Range: {}", ip.classify());
    println!("   ├─ Recent: {}", state.lists.recent().contains(ip));
    println!("   ├─ Trusted: {}", state.lists.trusted().contains(ip));
    println!("   └─ Pink-listed: {}", state.lists.is_banned(ip));
    Ok(())
}

/// Shuffle a list and save it
pub fn cmd_shuffle(state: &mut AppState, kind: ListKind) -> CliResult<()> {
    let mut rng = rand::thread_rng();
    state.lists.shuffle(kind, &mut rng);
    state.store.save(kind.into(), state.lists.list(kind))?;

    println!("🔀 Shuffled {} peers", state.lists.list(kind).len());
    Ok(())
}

/// Import another list file into a list
pub fn cmd_import(state: &mut AppState, input: &Path, kind: ListKind) -> CliResult<()> {
    let policy = state.lists.policy();

    // Read into a scratch list first so banned entries can be filtered out
    let mut incoming = BoundedAddressSet::new(state.lists.list(kind).capacity());
    let read = state.store.import(input, &mut incoming, policy)?;

    let added = incoming
        .iter()
        .filter(|&ip| state.lists.admit_peer(ip, kind))
        .count();

    state.store.save(kind.into(), state.lists.list(kind))?;

    println!("📥 Imported {} of {} peers from {:?}", added, read, input);
    Ok(())
}

/// Erase the epoch pink list
pub fn cmd_purge_epoch(state: &mut AppState) -> CliResult<()> {
    let count = state.lists.pink().epoch().len();
    state.lists.purge_epoch();

    println!("🧹 Purged {} epoch pink-list entries", count);
    Ok(())
}
