//! Builder for has-many relations stored as an array of foreign keys.

use super::{resolve, Builder};
use crate::config::RelationOptions;
use crate::executor::LifeError;
use crate::model::LifeModelTrait;
use crate::relation::candidate::Candidate;
use crate::relation::lookup::Lookup;
use crate::relation::metadata::RelationMetadata;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Resolves a `references_many` relation stored as an id array.
///
/// - empty value: empty result, no lookup
/// - loaded models: returned as given, no lookup
/// - identifiers: one lookup for all of them, result passed through as-is
///
/// The lookup may return fewer models than identifiers; that is not an error.
///
/// ```
/// use tether::{Builder, Candidate, ManyAsArray, MemoryLookup, RelationMetadata};
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
/// let metadata = RelationMetadata::<Post>::references_many("posts");
/// let store = MemoryLookup::<Post>::new(vec![PostModel { id: 42 }]);
///
/// let posts = ManyAsArray::new(&metadata, Candidate::Ids(vec![Value::BigInt(Some(42))]), &store)
///     .build()
///     .unwrap();
/// assert_eq!(posts, vec![PostModel { id: 42 }]);
/// assert_eq!(store.call_count(), 1);
/// ```
pub struct ManyAsArray<'a, E: LifeModelTrait, L: ?Sized> {
    metadata: &'a RelationMetadata<E>,
    candidate: Candidate<E::Model>,
    lookup: &'a L,
    options: RelationOptions,
}

impl<'a, E, L> ManyAsArray<'a, E, L>
where
    E: LifeModelTrait,
    L: Lookup<E> + ?Sized,
{
    pub fn new(
        metadata: &'a RelationMetadata<E>,
        candidate: Candidate<E::Model>,
        lookup: &'a L,
    ) -> Self {
        Self {
            metadata,
            candidate,
            lookup,
            options: RelationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RelationOptions) -> Self {
        self.options = options;
        self
    }
}

impl<E, L> Builder for ManyAsArray<'_, E, L>
where
    E: LifeModelTrait,
    L: Lookup<E> + ?Sized,
{
    type Output = Vec<E::Model>;

    fn query(&self) -> bool {
        matches!(self.candidate, Candidate::Ids(_)) && !self.candidate.is_empty()
    }

    fn build(self) -> Result<Vec<E::Model>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::relation_build_span(
            self.metadata.name(),
            self.metadata.relation_type().as_str(),
        )
        .entered();

        match self.candidate {
            Candidate::Models(models) => {
                log::debug!(
                    "relation '{}' already holds {} model(s), skipping lookup",
                    self.metadata.name(),
                    models.len()
                );
                Ok(models)
            }
            Candidate::Ids(ids) if ids.is_empty() => Ok(Vec::new()),
            Candidate::Ids(ids) => resolve(self.metadata, self.lookup, &ids, &self.options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelTrait;
    use crate::relation::candidate::Element;
    use crate::relation::lookup::MemoryLookup;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use sea_query::Value;

    struct Post;

    #[derive(Debug, Clone, PartialEq)]
    struct PostModel {
        id: i64,
        title: String,
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

    fn post(id: i64) -> PostModel {
        PostModel {
            id,
            title: Sentence(2..5).fake(),
        }
    }

    fn id(n: i64) -> Value {
        Value::BigInt(Some(n))
    }

    fn metadata() -> RelationMetadata<Post> {
        RelationMetadata::references_many("posts")
    }

    #[test]
    fn test_ids_are_looked_up_once() {
        let metadata = metadata();
        let post_a = post(42);
        let store = MemoryLookup::<Post>::new(vec![post_a.clone(), post(7)]);

        let builder = ManyAsArray::new(&metadata, Candidate::Ids(vec![id(42)]), &store);
        assert!(builder.query());
        let documents = builder.build().unwrap();

        assert_eq!(documents, vec![post_a]);
        assert_eq!(store.calls(), vec![vec![id(42)]]);
    }

    #[test]
    fn test_models_are_returned_without_lookup() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::empty();
        let models = vec![post(3), post(1), post(2)];

        let builder = ManyAsArray::new(&metadata, Candidate::Models(models.clone()), &store);
        assert!(!builder.query());
        let documents = builder.build().unwrap();

        assert_eq!(documents, models);
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_empty_value_never_looks_up() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::new(vec![post(1)]);

        for candidate in [Candidate::<PostModel>::Ids(vec![]), Candidate::Models(vec![])] {
            let builder = ManyAsArray::new(&metadata, candidate, &store);
            assert!(!builder.query());
            assert!(builder.build().unwrap().is_empty());
        }
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    fn test_partial_resolution_passes_through() {
        let metadata = metadata();
        let post_a = post(42);
        let store = MemoryLookup::<Post>::new(vec![post_a.clone()]);

        let documents = ManyAsArray::new(&metadata, Candidate::Ids(vec![id(42), id(43)]), &store)
            .with_options(RelationOptions {
                warn_on_unresolved: false,
            })
            .build()
            .unwrap();

        assert_eq!(documents, vec![post_a]);
        assert_eq!(store.calls(), vec![vec![id(42), id(43)]]);
    }

    #[test]
    fn test_lookup_order_is_kept() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::new(vec![post(1), post(2), post(3)]);

        let candidate = Candidate::Ids(vec![id(3), id(1), id(2)]);
        let documents = ManyAsArray::new(&metadata, candidate, &store).build().unwrap();

        let ids: Vec<i64> = documents.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_lookup_failure_is_returned_unchanged() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::new(vec![post(42)]);
        store.fail_next(LifeError::QueryError("server closed the connection".into()));

        let err = ManyAsArray::new(&metadata, Candidate::Ids(vec![id(42)]), &store)
            .build()
            .unwrap_err();

        match err {
            LifeError::QueryError(msg) => assert_eq!(msg, "server closed the connection"),
            other => panic!("expected the lookup's own error, got {other:?}"),
        }
        assert_eq!(store.call_count(), 1);
    }

    #[test]
    fn test_repeated_builds_are_not_cached() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::new(vec![post(42)]);

        let build = || ManyAsArray::new(&metadata, Candidate::Ids(vec![id(42)]), &store).build();
        let first = build().unwrap();
        let second = build().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.call_count(), 2);
    }

    #[test]
    fn test_mixed_value_led_by_model_skips_lookup() {
        let metadata = metadata();
        let store = MemoryLookup::<Post>::new(vec![post(2)]);
        let leading = post(1);

        let candidate = Candidate::classify(vec![
            Element::Model(leading.clone()),
            Element::Key(id(2)),
        ]);
        let documents = ManyAsArray::new(&metadata, candidate, &store).build().unwrap();

        assert_eq!(documents, vec![leading]);
        assert_eq!(store.call_count(), 0);
    }
}
