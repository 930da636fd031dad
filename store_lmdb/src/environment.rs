//! LMDB environment setup.

use crate::LmdbError;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use tracing::info;

/// Default map size (1 GiB). LMDB reserves address space, not disk.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    /// Governor identity -> insertion sequence.
    pub(crate) members_db: Database<Bytes, Bytes>,
    /// Institution identity -> insertion sequence.
    pub(crate) institutions_db: Database<Bytes, Bytes>,
    /// Big-endian proposal id -> encoded proposal row.
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    /// Big-endian proposal id ++ voter identity -> insertion sequence.
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment in the directory `path`.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::DataDir {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // SAFETY: the environment is opened once per process and the data
        // files are not modified by anything other than LMDB.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let members_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("members"))?;
        let institutions_db =
            env.create_database::<Bytes, Bytes>(&mut wtxn, Some("institutions"))?;
        let proposals_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("proposals"))?;
        let votes_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("votes"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "LMDB environment opened");
        Ok(Self {
            env,
            members_db,
            institutions_db,
            proposals_db,
            votes_db,
            meta_db,
        })
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }
}
