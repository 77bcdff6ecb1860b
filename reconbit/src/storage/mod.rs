pub mod entity_table;
pub mod detail_table;

use crate::error::AppError;
use crate::info;
use redb::{Database, ReadTransaction, WriteTransaction};
use std::path::PathBuf;
use std::sync::Arc;
use std::{env, fs};

pub use detail_table::DetailTable;
pub use entity_table::EntityTable;

const DB_FILE: &str = "reconbit.redb";

fn cache_bytes(cache_size_mb: usize) -> usize {
    cache_size_mb.saturating_mul(1024 * 1024)
}

#[derive(Clone)]
pub struct Storage {
    pub db: Arc<Database>,
}

impl Storage {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Opens `<db_dir>/reconbit.redb`, creating directory and file on first use.
    /// The returned flag tells whether the database was freshly created.
    pub fn init(db_dir: PathBuf, db_cache_size_mb: usize) -> Result<(bool, Arc<Storage>), AppError> {
        let db_path = db_dir.join(DB_FILE);
        let created = !db_path.exists();
        if !db_dir.exists() {
            fs::create_dir_all(&db_dir)?;
        }
        if !created {
            info!("Opening existing db at {:?}", db_path);
        }
        let db = Database::builder()
            .set_cache_size(cache_bytes(db_cache_size_mb))
            .create(db_path)?;
        Ok((created, Arc::new(Storage::new(Arc::new(db)))))
    }

    pub fn temp(name: &str, random: bool) -> Result<Arc<Storage>, AppError> {
        let db_name = if random {
            format!("{}_{}", name, rand::random::<u64>())
        } else {
            name.to_string()
        };
        let db_dir = env::temp_dir().join("reconbit").join(db_name);
        if random && db_dir.exists() {
            fs::remove_dir_all(&db_dir)?;
        }
        let (_, storage) = Storage::init(db_dir, 16)?;
        Ok(storage)
    }

    pub fn begin_write(&self) -> Result<WriteTransaction, AppError> {
        Ok(self.db.begin_write()?)
    }

    pub fn begin_read(&self) -> Result<ReadTransaction, AppError> {
        Ok(self.db.begin_read()?)
    }
}

/// Throwaway storage for tests.
pub fn random_storage() -> Arc<Storage> {
    Storage::temp("test", true).expect("Failed to create test storage")
}

/// Either side of redb's transaction split, so readers can run inside a save or in a plain retrieval.
#[derive(Clone, Copy)]
pub enum TxView<'a> {
    Read(&'a ReadTransaction),
    Write(&'a WriteTransaction),
}
