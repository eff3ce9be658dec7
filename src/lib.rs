//! # Tether
//!
//! Reference relation builders for a coroutine-native PostgreSQL document mapper.
//!
//! An owning model stores a relation either as foreign keys or as already loaded
//! models. The builders in [`relation`] turn that stored value into models,
//! issuing a single lookup only when keys are present.
//!
//! ```
//! use tether::{Builder, Candidate, ManyAsArray, MemoryLookup, RelationMetadata};
//! # use tether::{LifeModelTrait, ModelTrait};
//! use sea_query::Value;
//! # struct Post;
//! # #[derive(Debug, Clone, PartialEq)]
//! # struct PostModel { id: i64 }
//! # impl LifeModelTrait for Post {
//! #     type Model = PostModel;
//! #     const TABLE_NAME: &'static str = "posts";
//! # }
//! # impl ModelTrait for PostModel {
//! #     type Entity = Post;
//! #     fn get_primary_key_value(&self) -> Value { Value::BigInt(Some(self.id)) }
//! # }
//!
//! let metadata = RelationMetadata::<Post>::references_many("posts");
//! let store = MemoryLookup::<Post>::empty();
//! let loaded = vec![PostModel { id: 1 }];
//!
//! let posts = ManyAsArray::new(&metadata, Candidate::Models(loaded.clone()), &store).build()?;
//! assert_eq!(posts, loaded);
//! assert_eq!(store.call_count(), 0);
//! # Ok::<(), tether::LifeError>(())
//! ```

pub mod config;
pub mod connection;
pub mod executor;
pub mod metrics;
pub mod model;
pub mod query;
pub mod relation;

pub use config::{RelationOptions, TetherConfig};
pub use connection::{connect, ConnectionError};
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use model::{LifeModelTrait, ModelTrait};
pub use query::{FromRow, SelectQuery};
pub use relation::{
    Builder, Candidate, Element, ExecutorLookup, Lookup, ManyAsArray, MemoryLookup, Reference,
    ReferencedIn, RelationMetadata, RelationType,
};
