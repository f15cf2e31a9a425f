use crate::{
    data::student::{Student, UpdateStudent},
    error::RosterResult,
};
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Which key a single-document lookup goes by.
#[derive(Debug, Copy, Clone)]
pub enum Filter<'a> {
    /// The public `id` the API hands out.
    Id(&'a str),
    /// The store's own key for the document, as returned by [`StudentStore::insert_one`].
    InternalKey(Uuid),
}

/// A collection of student documents.
///
/// Every method is one round trip to the store. Counts returned by
/// [`update_one`](StudentStore::update_one) only include documents whose
/// contents actually changed, so re-writing a stored value reports `0`.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    async fn insert_one(&self, student: &Student) -> RosterResult<Uuid>;
    async fn find_one(&self, filter: Filter<'_>) -> RosterResult<Option<Student>>;
    async fn find_many(&self, limit: usize) -> RosterResult<Vec<Student>>;
    async fn update_one(&self, id: &str, changes: &UpdateStudent) -> RosterResult<u64>;
    async fn delete_one(&self, id: &str) -> RosterResult<u64>;

    async fn close(&self) {}
}
