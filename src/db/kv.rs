//! Generic key/value storage behind the service: string keys, JSON values.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed value under {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub enum KvStore {
    Memory(MemoryKv),
    Postgres(PgPool),
}

impl KvStore {
    pub async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        match self {
            KvStore::Memory(mem) => mem.get(key).await,
            KvStore::Postgres(pool) => {
                let value = sqlx::query_scalar::<_, Value>("SELECT value FROM kv_store WHERE key = $1")
                    .bind(key)
                    .fetch_optional(pool)
                    .await?;
                Ok(value)
            }
        }
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        match self {
            KvStore::Memory(mem) => mem.set(key, value).await,
            KvStore::Postgres(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO kv_store (key, value) VALUES ($1, $2)
                    ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
                    "#,
                )
                .bind(key)
                .bind(sqlx::types::Json(value))
                .execute(pool)
                .await?;
                Ok(())
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), KvError> {
        match self {
            KvStore::Memory(mem) => mem.delete(key).await,
            KvStore::Postgres(pool) => {
                sqlx::query("DELETE FROM kv_store WHERE key = $1")
                    .bind(key)
                    .execute(pool)
                    .await?;
                Ok(())
            }
        }
    }

    /// Checks that the backing store answers at all.
    pub async fn ping(&self) -> Result<(), KvError> {
        match self {
            KvStore::Memory(mem) => mem.check(),
            KvStore::Postgres(pool) => {
                sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
                Ok(())
            }
        }
    }

    /// Checks that the key/value table exists and can be queried.
    pub async fn check_table(&self) -> Result<(), KvError> {
        match self {
            KvStore::Memory(mem) => mem.check(),
            KvStore::Postgres(pool) => {
                sqlx::query_scalar::<_, String>("SELECT key FROM kv_store LIMIT 1")
                    .fetch_optional(pool)
                    .await?;
                Ok(())
            }
        }
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| KvError::Malformed {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let value = serde_json::to_value(value).map_err(|source| KvError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.set(key, value).await
    }
}

/// In-process store used when no database is configured, and in tests.
/// `set_failing(true)` makes every operation fail like an outage.
#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<HashMap<String, Value>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check(&self) -> Result<(), KvError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("memory store is failing".into()));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        self.check()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        self.check()?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.check()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
