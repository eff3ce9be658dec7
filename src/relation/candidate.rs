//! Raw relation values as held by the owning model.
//!
//! An owner that tracks its own state hands builders a [`Candidate`] (or a
//! [`Reference`] for single-key relations) directly. Owners that only have an
//! untyped list of [`Element`]s go through [`Candidate::classify`], which keeps
//! the first-element rule: whatever the first element is decides for the whole
//! list.

use crate::model::ModelTrait;
use sea_query::Value;

/// Value of a has-many-as-array relation before it is built
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate<M> {
    /// Foreign keys that still need a lookup
    Ids(Vec<Value>),
    /// Models that are already loaded
    Models(Vec<M>),
}

/// One element of an untyped relation value
#[derive(Debug, Clone, PartialEq)]
pub enum Element<M> {
    /// A raw foreign key
    Key(Value),
    /// A loaded model of the target entity
    Model(M),
}

impl<M: ModelTrait> Candidate<M> {
    /// Classify an untyped list by its first element.
    ///
    /// A list led by a model keeps only its models; keys in it are dropped and
    /// never looked up. A list led by a key becomes identifiers, with any model
    /// in it contributing its primary key.
    ///
    /// ```
    /// use tether::{Candidate, Element};
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
    /// let ids = Candidate::<PostModel>::classify(vec![Element::Key(Value::BigInt(Some(42)))]);
    /// assert_eq!(ids, Candidate::Ids(vec![Value::BigInt(Some(42))]));
    ///
    /// let post = PostModel { id: 7 };
    /// let models = Candidate::classify(vec![Element::Model(post.clone())]);
    /// assert_eq!(models, Candidate::Models(vec![post]));
    /// ```
    pub fn classify(elements: Vec<Element<M>>) -> Self {
        match elements.first() {
            None => Candidate::Ids(Vec::new()),
            Some(Element::Model(_)) => {
                let total = elements.len();
                let models: Vec<M> = elements
                    .into_iter()
                    .filter_map(|element| match element {
                        Element::Model(model) => Some(model),
                        Element::Key(_) => None,
                    })
                    .collect();
                if models.len() < total {
                    log::warn!(
                        "mixed relation value: dropped {} key(s) after a leading model",
                        total - models.len()
                    );
                }
                Candidate::Models(models)
            }
            Some(Element::Key(_)) => Candidate::Ids(
                elements
                    .into_iter()
                    .map(|element| match element {
                        Element::Key(id) => id,
                        Element::Model(model) => model.get_primary_key_value(),
                    })
                    .collect(),
            ),
        }
    }
}

impl<M> Candidate<M> {
    pub fn is_empty(&self) -> bool {
        match self {
            Candidate::Ids(ids) => ids.is_empty(),
            Candidate::Models(models) => models.is_empty(),
        }
    }
}

/// Value of a single-key relation before it is built
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<M> {
    /// No foreign key set
    None,
    /// A foreign key that still needs a lookup
    Key(Value),
    /// An already loaded model
    Model(M),
}
