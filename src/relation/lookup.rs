//! Storage access point used by relation builders.
//!
//! Builders resolve identifiers through the [`Lookup`] trait and nothing else.
//! [`ExecutorLookup`] runs a `WHERE pk IN (...)` query through a
//! [`LifeExecutor`]; [`MemoryLookup`] serves models from memory and records
//! every call, for tests and fixtures.

use crate::executor::{LifeError, LifeExecutor};
use crate::model::{LifeModelTrait, ModelTrait};
use crate::query::{FromRow, SelectQuery};
use sea_query::Value;
use std::sync::{Mutex, MutexGuard};

/// Resolves identifiers of entity `E` into loaded models
pub trait Lookup<E: LifeModelTrait> {
    /// Find every model whose primary key is in `ids`.
    ///
    /// The result order is the store's, not necessarily the order of `ids`.
    /// Identifiers that match nothing are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the underlying store fails.
    fn find_by_ids(&self, ids: &[Value]) -> Result<Vec<E::Model>, LifeError>;
}

impl<E: LifeModelTrait, L: Lookup<E> + ?Sized> Lookup<E> for &L {
    fn find_by_ids(&self, ids: &[Value]) -> Result<Vec<E::Model>, LifeError> {
        (**self).find_by_ids(ids)
    }
}

/// Lookup backed by a database executor
///
/// ```no_run
/// use tether::{ExecutorLookup, MayPostgresExecutor, TetherConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = MayPostgresExecutor::from_config(&TetherConfig::load()?)?;
/// let lookup = ExecutorLookup::new(&executor);
/// # let _ = lookup;
/// # Ok(())
/// # }
/// ```
pub struct ExecutorLookup<'a, Ex: ?Sized> {
    executor: &'a Ex,
}

impl<'a, Ex: LifeExecutor + ?Sized> ExecutorLookup<'a, Ex> {
    pub fn new(executor: &'a Ex) -> Self {
        Self { executor }
    }
}

impl<E, Ex> Lookup<E> for ExecutorLookup<'_, Ex>
where
    E: LifeModelTrait,
    E::Model: FromRow,
    Ex: LifeExecutor + ?Sized,
{
    fn find_by_ids(&self, ids: &[Value]) -> Result<Vec<E::Model>, LifeError> {
        SelectQuery::<E>::find_by_ids(ids).all(self.executor)
    }
}

/// In-memory lookup that records its calls
///
/// Models are returned in insertion order. [`MemoryLookup::fail_next`] makes
/// the next call return an error instead, which is how lookup failures are
/// simulated.
///
/// ```
/// use tether::{Lookup, MemoryLookup};
/// # use tether::{LifeModelTrait, ModelTrait};
/// use sea_query::Value;
/// # struct Post;
/// # #[derive(Debug, Clone, PartialEq)]
/// # struct PostModel { id: i64 }
/// # impl LifeModelTrait for Post {
/// #     type Model = PostModel;
/// #     const TABLE_NAME: &'static str = "posts";
/// # }
/// # impl ModelTrait for PostModel {
/// #     type Entity = Post;
/// #     fn get_primary_key_value(&self) -> Value { Value::BigInt(Some(self.id)) }
/// # }
///
/// let store = MemoryLookup::<Post>::new(vec![PostModel { id: 1 }, PostModel { id: 2 }]);
/// let found = store.find_by_ids(&[Value::BigInt(Some(2)), Value::BigInt(Some(9))]).unwrap();
/// assert_eq!(found, vec![PostModel { id: 2 }]);
/// assert_eq!(store.call_count(), 1);
/// ```
pub struct MemoryLookup<E: LifeModelTrait> {
    models: Vec<E::Model>,
    calls: Mutex<Vec<Vec<Value>>>,
    next_error: Mutex<Option<LifeError>>,
}

impl<E: LifeModelTrait> MemoryLookup<E> {
    pub fn new(models: Vec<E::Model>) -> Self {
        Self {
            models,
            calls: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Fail the next `find_by_ids` call with `err`
    pub fn fail_next(&self, err: LifeError) {
        *lock(&self.next_error) = Some(err);
    }

    /// Identifier lists of every call so far, oldest first
    pub fn calls(&self) -> Vec<Vec<Value>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

impl<E: LifeModelTrait> Lookup<E> for MemoryLookup<E> {
    fn find_by_ids(&self, ids: &[Value]) -> Result<Vec<E::Model>, LifeError> {
        lock(&self.calls).push(ids.to_vec());

        if let Some(err) = lock(&self.next_error).take() {
            return Err(err);
        }

        Ok(self
            .models
            .iter()
            .filter(|model| ids.contains(&model.get_primary_key_value()))
            .cloned()
            .collect())
    }
}

// A panic while holding the lock cannot leave the recorded data half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
