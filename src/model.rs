//! Entity and model traits.
//!
//! An *entity* is the type-level description of a stored collection (its table
//! and primary-key column). A *model* is one loaded row of that entity. Relation
//! metadata names its target by entity type, and lookups resolve identifiers
//! into models.

use sea_query::Value;
use std::fmt::Debug;

/// Type-level description of a stored entity.
///
/// # Example
///
/// ```
/// use tether::{LifeModelTrait, ModelTrait};
/// use sea_query::Value;
///
/// struct Post;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct PostModel {
///     id: i64,
///     title: String,
/// }
///
/// impl LifeModelTrait for Post {
///     type Model = PostModel;
///     const TABLE_NAME: &'static str = "posts";
/// }
///
/// impl ModelTrait for PostModel {
///     type Entity = Post;
///     fn get_primary_key_value(&self) -> Value {
///         Value::BigInt(Some(self.id))
///     }
/// }
///
/// assert_eq!(Post::PRIMARY_KEY, "id");
/// ```
pub trait LifeModelTrait: Sized + 'static {
    /// The loaded form of this entity
    type Model: ModelTrait<Entity = Self>;

    /// Table (or collection) the entity is stored in
    const TABLE_NAME: &'static str;

    /// Primary key column identifiers are matched against
    const PRIMARY_KEY: &'static str = "id";
}

/// Trait for Model-level operations
pub trait ModelTrait: Clone + Send + Debug {
    /// The Entity type that this Model belongs to
    type Entity: LifeModelTrait;

    /// Get the primary key value from the model
    fn get_primary_key_value(&self) -> Value;
}
