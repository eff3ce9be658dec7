//! Relation builders.
//!
//! A builder takes a relation's raw value and produces what the relation points
//! to, going to storage only when the raw value holds identifiers. One builder
//! is created per build and consumed by [`Builder::build`].

mod many_as_array;
mod referenced_in;

pub use many_as_array::ManyAsArray;
pub use referenced_in::ReferencedIn;

use crate::config::RelationOptions;
use crate::executor::LifeError;
use crate::model::LifeModelTrait;
use crate::relation::lookup::Lookup;
use crate::relation::metadata::RelationMetadata;
use sea_query::Value;
use std::collections::HashSet;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Common interface of relation builders
pub trait Builder {
    type Output;

    /// Whether `build` would issue a lookup
    fn query(&self) -> bool;

    /// Resolve the relation.
    ///
    /// # Errors
    ///
    /// Lookup failures are returned exactly as the lookup produced them.
    fn build(self) -> Result<Self::Output, LifeError>;
}

/// Issue the single lookup for `ids` and pass its result through.
fn resolve<E, L>(
    metadata: &RelationMetadata<E>,
    lookup: &L,
    ids: &[Value],
    options: &RelationOptions,
) -> Result<Vec<E::Model>, LifeError>
where
    E: LifeModelTrait,
    L: Lookup<E> + ?Sized,
{
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::relation_lookup_span(metadata.name(), ids.len()).entered();

    let start = Instant::now();
    let models = lookup.find_by_ids(ids)?;
    let elapsed = start.elapsed();

    let requested = distinct_count(ids);
    let unresolved = requested.saturating_sub(models.len());

    #[cfg(feature = "metrics")]
    METRICS.record_relation_lookup(metadata.name(), elapsed, unresolved);

    log::debug!(
        "relation '{}' looked up {} id(s) in '{}', found {} in {:?}",
        metadata.name(),
        requested,
        metadata.target_table(),
        models.len(),
        elapsed
    );

    if unresolved > 0 && options.warn_on_unresolved {
        log::warn!(
            "relation '{}' ({}): {} of {} id(s) did not resolve in '{}'",
            metadata.name(),
            metadata.foreign_key(),
            unresolved,
            requested,
            metadata.target_table()
        );
    }

    Ok(models)
}

// `Value` is not `Hash`; its debug rendering is a stable key for identifier kinds.
fn distinct_count(ids: &[Value]) -> usize {
    ids.iter()
        .map(|id| format!("{id:?}"))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelTrait;
    use crate::relation::lookup::MemoryLookup;
    use log::Level;

    struct Post;

    #[derive(Debug, Clone, PartialEq)]
    struct PostModel {
        id: i64,
    }

    impl LifeModelTrait for Post {
        type Model = PostModel;
        const TABLE_NAME: &'static str = "posts";
    }

    impl ModelTrait for PostModel {
        type Entity = Post;
        fn get_primary_key_value(&self) -> Value {
            Value::BigInt(Some(self.id))
        }
    }

    fn id(n: i64) -> Value {
        Value::BigInt(Some(n))
    }

    fn warnings(logs: &[testing_logger::CapturedLog]) -> Vec<String> {
        logs.iter()
            .filter(|log| log.level == Level::Warn)
            .map(|log| log.body.clone())
            .collect()
    }

    #[test]
    fn test_distinct_count_ignores_repeats() {
        assert_eq!(distinct_count(&[id(1), id(2), id(1)]), 2);
        assert_eq!(distinct_count(&[id(1), Value::Int(Some(1))]), 2);
        assert_eq!(distinct_count(&[]), 0);
    }

    #[test]
    fn test_distinct_count_handles_large_arrays() {
        let ids: Vec<Value> = (0..20_000).map(|n| id(n % 5_000)).collect();
        assert_eq!(distinct_count(&ids), 5_000);
    }

    #[test]
    fn test_unresolved_ids_are_warned_by_default() {
        testing_logger::setup();
        let metadata = RelationMetadata::<Post>::references_many("posts");
        let store = MemoryLookup::<Post>::new(vec![PostModel { id: 42 }]);

        let models =
            resolve(&metadata, &store, &[id(42), id(43)], &RelationOptions::default()).unwrap();

        assert_eq!(models, vec![PostModel { id: 42 }]);
        testing_logger::validate(|logs| {
            let warned = warnings(logs);
            assert_eq!(warned.len(), 1, "{warned:?}");
            assert!(warned[0].contains("posts"), "{}", warned[0]);
            assert!(warned[0].contains("1 of 2"), "{}", warned[0]);
        });
    }

    #[test]
    fn test_unresolved_warning_can_be_disabled() {
        testing_logger::setup();
        let metadata = RelationMetadata::<Post>::references_many("posts");
        let store = MemoryLookup::<Post>::new(vec![PostModel { id: 42 }]);
        let quiet = RelationOptions {
            warn_on_unresolved: false,
        };

        let models = resolve(&metadata, &store, &[id(42), id(43)], &quiet).unwrap();

        assert_eq!(models.len(), 1);
        testing_logger::validate(|logs| assert!(warnings(logs).is_empty()));
    }

    #[test]
    fn test_fully_resolved_lookup_is_not_warned() {
        testing_logger::setup();
        let metadata = RelationMetadata::<Post>::references_many("posts");
        let store = MemoryLookup::<Post>::new(vec![PostModel { id: 42 }]);

        resolve(&metadata, &store, &[id(42), id(42)], &RelationOptions::default()).unwrap();

        testing_logger::validate(|logs| assert!(warnings(logs).is_empty()));
    }
}
