//! Builder for relations stored as a single foreign key.

use super::{resolve, Builder};
use crate::config::RelationOptions;
use crate::executor::LifeError;
use crate::model::LifeModelTrait;
use crate::relation::candidate::Reference;
use crate::relation::lookup::Lookup;
use crate::relation::metadata::RelationMetadata;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Resolves a `referenced_in` relation.
///
/// A key is looked up on its own and yields the first model found, or `None`
/// when nothing matches. A loaded model is returned without a lookup.
pub struct ReferencedIn<'a, E: LifeModelTrait, L: ?Sized> {
    metadata: &'a RelationMetadata<E>,
    reference: Reference<E::Model>,
    lookup: &'a L,
    options: RelationOptions,
}

impl<'a, E, L> ReferencedIn<'a, E, L>
where
    E: LifeModelTrait,
    L: Lookup<E> + ?Sized,
{
    pub fn new(
        metadata: &'a RelationMetadata<E>,
        reference: Reference<E::Model>,
        lookup: &'a L,
    ) -> Self {
        Self {
            metadata,
            reference,
            lookup,
            options: RelationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RelationOptions) -> Self {
        self.options = options;
        self
    }
}

impl<E, L> Builder for ReferencedIn<'_, E, L>
where
    E: LifeModelTrait,
    L: Lookup<E> + ?Sized,
{
    type Output = Option<E::Model>;

    fn query(&self) -> bool {
        matches!(self.reference, Reference::Key(_))
    }

    fn build(self) -> Result<Option<E::Model>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::relation_build_span(
            self.metadata.name(),
            self.metadata.relation_type().as_str(),
        )
        .entered();

        match self.reference {
            Reference::None => Ok(None),
            Reference::Model(model) => Ok(Some(model)),
            Reference::Key(id) => {
                let models = resolve(self.metadata, self.lookup, &[id], &self.options)?;
                Ok(models.into_iter().next())
            }
        }
    }
}
