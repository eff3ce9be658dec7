//! Relation metadata.
//!
//! Describes one association from an owning entity to a target entity `E`: its
//! name, kind and the foreign-key attribute on the owning side. Metadata is
//! built once by the owning model and only read by the builders.

use crate::model::LifeModelTrait;
use std::fmt;
use std::marker::PhantomData;

/// Kind of reference a relation stores on the owning side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// Has-many, stored as an array of foreign keys on the owner
    ReferencesManyAsArray,
    /// Belongs-to, stored as a single foreign key on the owner
    ReferencedIn,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::ReferencesManyAsArray => "references_many_as_array",
            RelationType::ReferencedIn => "referenced_in",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one relation targeting entity `E`
///
/// ```
/// use tether::{LifeModelTrait, ModelTrait, RelationMetadata, RelationType};
/// # use sea_query::Value;
/// # struct Post;
/// # #[derive(Debug, Clone)]
/// # struct PostModel;
/// # impl LifeModelTrait for Post {
/// #     type Model = PostModel;
/// #     const TABLE_NAME: &'static str = "posts";
/// # }
/// # impl ModelTrait for PostModel {
/// #     type Entity = Post;
/// #     fn get_primary_key_value(&self) -> Value { Value::BigInt(None) }
/// # }
///
/// let metadata = RelationMetadata::<Post>::references_many("posts");
/// assert_eq!(metadata.name(), "posts");
/// assert_eq!(metadata.foreign_key(), "post_ids");
/// assert_eq!(metadata.relation_type(), RelationType::ReferencesManyAsArray);
/// assert_eq!(metadata.target_table(), "posts");
/// ```
pub struct RelationMetadata<E> {
    name: String,
    foreign_key: String,
    relation_type: RelationType,
    _target: PhantomData<fn() -> E>,
}

impl<E: LifeModelTrait> RelationMetadata<E> {
    /// Has-many relation stored as an array of ids, e.g. `posts` -> `post_ids`
    pub fn references_many(name: impl Into<String>) -> Self {
        let name = name.into();
        let foreign_key = format!("{}_ids", singularize(&name));
        Self::new(name, foreign_key, RelationType::ReferencesManyAsArray)
    }

    /// Belongs-to relation stored as a single id, e.g. `person` -> `person_id`
    pub fn referenced_in(name: impl Into<String>) -> Self {
        let name = name.into();
        let foreign_key = format!("{}_id", singularize(&name));
        Self::new(name, foreign_key, RelationType::ReferencedIn)
    }

    pub fn new(
        name: impl Into<String>,
        foreign_key: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            name: name.into(),
            foreign_key: foreign_key.into(),
            relation_type,
            _target: PhantomData,
        }
    }

    /// Override the derived foreign key
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    pub fn relation_type(&self) -> RelationType {
        self.relation_type
    }

    /// Table of the target entity
    pub fn target_table(&self) -> &'static str {
        E::TABLE_NAME
    }
}

impl<E> Clone for RelationMetadata<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            foreign_key: self.foreign_key.clone(),
            relation_type: self.relation_type,
            _target: PhantomData,
        }
    }
}

impl<E: LifeModelTrait> fmt::Debug for RelationMetadata<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationMetadata")
            .field("name", &self.name)
            .field("target", &E::TABLE_NAME)
            .field("foreign_key", &self.foreign_key)
            .field("relation_type", &self.relation_type)
            .finish()
    }
}

// Naive: only strips a trailing 's'. Irregular plurals need `with_foreign_key`.
fn singularize(name: &str) -> &str {
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}
