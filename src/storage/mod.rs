//! Storage module for peer list persistence

pub mod config;
pub mod persistence;

pub use config::{Capacities, ListConfig, ListFile, CONFIG_FILE, DEFAULT_DATA_DIR};
pub use persistence::{load_list, save_list, write_list, ListError, ListStore, LIST_PREFACE};
