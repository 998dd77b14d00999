//! Runtime configuration, taken from flags or the environment.

use crate::collection::PEOPLE_NAMESPACE;
use crate::store::FileStore;

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// JSON file the list is kept in.
    #[arg(long, env = "PEOPLE_STORE", default_value = "people.json", global = true)]
    pub store: PathBuf,

    /// Namespace inside the store file.
    #[arg(long, env = "PEOPLE_NAMESPACE", default_value = PEOPLE_NAMESPACE, global = true)]
    pub namespace: String,

    /// Log lifecycle details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Config {
    pub fn open_store(&self) -> FileStore {
        FileStore::new(&self.store)
    }
}
