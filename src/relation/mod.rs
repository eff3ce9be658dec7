//! Relation module for reference relations.
//!
//! This module turns a relation's stored value into the models it points to:
//! - references_many (as array): the owner stores an array of foreign keys
//! - referenced_in: the owner stores a single foreign key
//!
//! # Architecture
//!
//! - **Metadata**: what the relation is (`RelationMetadata`, `RelationType`)
//! - **Candidate**: the raw value held by the owner (`Candidate`, `Element`, `Reference`)
//! - **Lookup**: the storage access point (`Lookup`, `ExecutorLookup`, `MemoryLookup`)
//! - **Builder**: decides between pass-through and lookup (`ManyAsArray`, `ReferencedIn`)

pub mod metadata;
#[doc(inline)]
pub use metadata::{RelationMetadata, RelationType};

pub mod candidate;
#[doc(inline)]
pub use candidate::{Candidate, Element, Reference};

pub mod lookup;
#[doc(inline)]
pub use lookup::{ExecutorLookup, Lookup, MemoryLookup};

pub mod builder;
#[doc(inline)]
pub use builder::{Builder, ManyAsArray, ReferencedIn};
