//! Peerlist CLI Application
//!
//! A command-line interface for inspecting and editing a node's peer lists.

use clap::{Parser, Subcommand, ValueEnum};
use peerlist::cli::{self, AppState};
use peerlist::network::{ListKind, PolicyFlags};
use peerlist::storage::{ListFile, DEFAULT_DATA_DIR};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "peerlist")]
#[command(version)]
#[command(about = "Peer reputation and address lists for a P2P node", long_about = None)]
struct Cli {
    /// Data directory holding the list files
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Reject private-range addresses on admission
    #[arg(long)]
    no_private: bool,

    /// Disable all pink-list checks
    #[arg(long)]
    no_pinklist: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a list
    Show {
        /// List to print
        #[arg(short, long, value_enum, default_value = "recent")]
        list: ShowList,

        /// Print list sizes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an address to a list
    Add {
        /// Address or hostname
        address: String,

        /// Target list
        #[arg(short, long, value_enum, default_value = "recent")]
        list: PeerList,
    },

    /// Pink-list a misbehaving address
    Ban {
        /// Address or hostname
        address: String,
    },

    /// Show the range and ban status of an address
    Check {
        /// Address or hostname
        address: String,
    },

    /// Shuffle a list
    Shuffle {
        #[arg(short, long, value_enum, default_value = "recent")]
        list: PeerList,
    },

    /// Import addresses from another list file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Target list
        #[arg(short, long, value_enum, default_value = "trusted")]
        list: PeerList,
    },

    /// Erase the epoch pink list
    PurgeEpoch,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeerList {
    Recent,
    Trusted,
}

impl From<PeerList> for ListKind {
    fn from(list: PeerList) -> Self {
        match list {
            PeerList::Recent => ListKind::Recent,
            PeerList::Trusted => ListKind::Trusted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowList {
    Recent,
    Trusted,
    Epoch,
    Core,
}

impl From<ShowList> for ListFile {
    fn from(list: ShowList) -> Self {
        match list {
            ShowList::Recent => ListFile::Recent,
            ShowList::Trusted => ListFile::Trusted,
            ShowList::Epoch => ListFile::Epoch,
            ShowList::Core => ListFile::Core,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut policy = PolicyFlags::empty();
    policy.set(PolicyFlags::NO_PRIVATE, cli.no_private);
    policy.set(PolicyFlags::NO_PINKLIST, cli.no_pinklist);

    let mut state = AppState::new(cli.data_dir.clone(), policy)?;

    match cli.command {
        Commands::Show { list, json } => {
            cli::cmd_show(&state, list.into(), json)?;
        }
        Commands::Add { address, list } => {
            cli::cmd_add(&mut state, &address, list.into())?;
        }
        Commands::Ban { address } => {
            cli::cmd_ban(&mut state, &address)?;
        }
        Commands::Check { address } => {
            cli::cmd_check(&state, &address)?;
        }
        Commands::Shuffle { list } => {
            cli::cmd_shuffle(&mut state, list.into())?;
        }
        Commands::Import { input, list } => {
            cli::cmd_import(&mut state, &input, list.into())?;
        }
        Commands::PurgeEpoch => {
            cli::cmd_purge_epoch(&mut state)?;
        }
    }

    Ok(())
}
