//! Slot repository contract with SQLite and in-memory implementations.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for slot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Slot key outside the known set.
    UnknownSlot(String),
    /// Simulated or backend-reported write refusal (e.g. quota, read-only).
    WriteRejected(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownSlot(key) => write!(f, "unknown storage slot `{key}`"),
            Self::WriteRejected(message) => write!(f, "slot write rejected: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnknownSlot(_) | Self::WriteRejected(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The three persisted annotation collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    Favorites,
    Notes,
    Moods,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Favorites, Slot::Notes, Slot::Moods];

    /// Storage key for the slot.
    pub fn key(self) -> &'static str {
        match self {
            Slot::Favorites => "favorites",
            Slot::Notes => "notes",
            Slot::Moods => "moods",
        }
    }

    pub fn from_key(key: &str) -> RepoResult<Self> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.key() == key)
            .ok_or_else(|| RepoError::UnknownSlot(key.to_string()))
    }
}

/// String-keyed storage for serialized annotation collections.
pub trait SlotRepository {
    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>>;
    fn write_slot(&self, slot: Slot, value: &str) -> RepoResult<()>;
    /// Writes every entry or none of them.
    fn write_slots(&self, batch: &[(Slot, String)]) -> RepoResult<()>;
}

impl<R: SlotRepository + ?Sized> SlotRepository for &R {
    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>> {
        (**self).read_slot(slot)
    }

    fn write_slot(&self, slot: Slot, value: &str) -> RepoResult<()> {
        (**self).write_slot(slot, value)
    }

    fn write_slots(&self, batch: &[(Slot, String)]) -> RepoResult<()> {
        (**self).write_slots(batch)
    }
}

impl<R: SlotRepository + ?Sized> SlotRepository for Box<R> {
    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>> {
        (**self).read_slot(slot)
    }

    fn write_slot(&self, slot: Slot, value: &str) -> RepoResult<()> {
        (**self).write_slot(slot, value)
    }

    fn write_slots(&self, batch: &[(Slot, String)]) -> RepoResult<()> {
        (**self).write_slots(batch)
    }
}

/// SQLite-backed slot repository over a migrated connection.
pub struct SqliteSlotRepository {
    conn: Connection,
}

impl SqliteSlotRepository {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SlotRepository for SqliteSlotRepository {
    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT slot_value FROM storage_slots WHERE slot_key = ?1;",
                [slot.key()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, slot: Slot, value: &str) -> RepoResult<()> {
        upsert_slot(&self.conn, slot, value)
    }

    fn write_slots(&self, batch: &[(Slot, String)]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (slot, value) in batch {
            upsert_slot(&tx, *slot, value)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn upsert_slot(conn: &Connection, slot: Slot, value: &str) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO storage_slots (slot_key, slot_value)
         VALUES (?1, ?2)
         ON CONFLICT(slot_key) DO UPDATE SET
            slot_value = excluded.slot_value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![slot.key(), value],
    )?;
    Ok(())
}

/// In-process slot repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<BTreeMap<Slot, String>>,
    rejected: BTreeSet<Slot>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that keeps its seeded content and rejects every write.
    pub fn read_only(seed: impl IntoIterator<Item = (Slot, String)>) -> Self {
        Self {
            slots: RefCell::new(seed.into_iter().collect()),
            rejected: Slot::ALL.into_iter().collect(),
        }
    }

    /// Fails every later write that touches `slot`.
    pub fn rejecting(mut self, slot: Slot) -> Self {
        self.rejected.insert(slot);
        self
    }

    /// Seeds raw slot content, bypassing serialization.
    pub fn with_slot(self, slot: Slot, value: impl Into<String>) -> Self {
        self.slots.borrow_mut().insert(slot, value.into());
        self
    }

    pub fn raw(&self, slot: Slot) -> Option<String> {
        self.slots.borrow().get(&slot).cloned()
    }
}

impl SlotRepository for MemorySlotRepository {
    fn read_slot(&self, slot: Slot) -> RepoResult<Option<String>> {
        Ok(self.raw(slot))
    }

    fn write_slot(&self, slot: Slot, value: &str) -> RepoResult<()> {
        self.check_writable(slot)?;
        self.slots.borrow_mut().insert(slot, value.to_string());
        Ok(())
    }

    fn write_slots(&self, batch: &[(Slot, String)]) -> RepoResult<()> {
        for (slot, _) in batch {
            self.check_writable(*slot)?;
        }
        let mut slots = self.slots.borrow_mut();
        for (slot, value) in batch {
            slots.insert(*slot, value.clone());
        }
        Ok(())
    }
}

impl MemorySlotRepository {
    fn check_writable(&self, slot: Slot) -> RepoResult<()> {
        if self.rejected.contains(&slot) {
            let message = format!("slot `{}` is read-only", slot.key());
            return Err(RepoError::WriteRejected(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySlotRepository, Slot, SlotRepository};

    #[test]
    fn slot_keys_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_key(slot.key()).unwrap(), slot);
        }
        assert!(Slot::from_key("lyrics").is_err());
    }

    #[test]
    fn batch_write_is_all_or_nothing() {
        let repo = MemorySlotRepository::new()
            .with_slot(Slot::Favorites, "[7]")
            .rejecting(Slot::Notes);
        let batch = [
            (Slot::Favorites, "[1,2]".to_string()),
            (Slot::Notes, "{}".to_string()),
        ];

        assert!(repo.write_slots(&batch).is_err());
        assert_eq!(repo.raw(Slot::Favorites).as_deref(), Some("[7]"));
        assert_eq!(repo.raw(Slot::Notes), None);

        repo.write_slots(&batch[..1]).unwrap();
        assert_eq!(repo.raw(Slot::Favorites).as_deref(), Some("[1,2]"));
    }

    #[test]
    fn read_only_repository_rejects_writes_and_keeps_seed() {
        let repo = MemorySlotRepository::read_only([(Slot::Notes, "{}".to_string())]);
        assert!(repo.write_slot(Slot::Notes, "{\"1\":\"x\"}").is_err());
        assert_eq!(repo.read_slot(Slot::Notes).unwrap().as_deref(), Some("{}"));
    }
}
