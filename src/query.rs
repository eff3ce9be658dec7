//! Query builder for relation lookups.
//!
//! Builds parameterized `SELECT` statements with SeaQuery and runs them through a
//! [`LifeExecutor`]. The main consumer is the executor-backed relation lookup,
//! which asks for every row whose primary key is among a set of identifiers.

pub mod value_conversion;

use crate::executor::{LifeError, LifeExecutor};
use crate::model::LifeModelTrait;
use may_postgres::Row;
use sea_query::{
    Asterisk, DynIden, Expr, ExprTrait, Iden, PostgresQueryBuilder, SelectStatement, Value, Values,
};
use std::marker::PhantomData;
use value_conversion::with_converted_params;

/// Trait for types that can be created from a database row
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, may_postgres::Error>;
}

/// Query builder for selecting rows of entity `E`
///
/// ```
/// use tether::{LifeModelTrait, ModelTrait, SelectQuery};
/// use sea_query::Value;
///
/// # struct Post;
/// # #[derive(Debug, Clone)]
/// # struct PostModel { id: i64 }
/// # impl LifeModelTrait for Post {
/// #     type Model = PostModel;
/// #     const TABLE_NAME: &'static str = "posts";
/// # }
/// # impl ModelTrait for PostModel {
/// #     type Entity = Post;
/// #     fn get_primary_key_value(&self) -> Value { Value::BigInt(Some(self.id)) }
/// # }
/// let (sql, values) = SelectQuery::<Post>::find_by_ids(&[Value::BigInt(Some(42))]).to_sql();
/// assert!(sql.starts_with(r#"SELECT * FROM "posts""#));
/// assert_eq!(values.iter().count(), 1);
/// ```
pub struct SelectQuery<E> {
    query: SelectStatement,
    _phantom: PhantomData<E>,
}

impl<E: LifeModelTrait> SelectQuery<E> {
    /// Create a new select query over the entity's table
    pub fn new() -> Self {
        struct TableName(&'static str);
        impl Iden for TableName {
            fn unquoted(&self) -> &str {
                self.0
            }
        }

        let mut query = SelectStatement::default();
        query.column(Asterisk).from(TableName(E::TABLE_NAME));
        Self {
            query,
            _phantom: PhantomData,
        }
    }

    /// Select every row whose primary key is one of `ids`
    ///
    /// Identifiers are bound as parameters, never inlined.
    pub fn find_by_ids(ids: &[Value]) -> Self {
        let pk = DynIden::from(E::PRIMARY_KEY.to_string());
        Self::new().filter(Expr::col(pk).is_in(ids.iter().cloned()))
    }

    /// Add a filter condition
    pub fn filter(mut self, condition: Expr) -> Self {
        self.query.and_where(condition);
        self
    }

    /// Render the statement as Postgres SQL plus its bound values
    pub fn to_sql(&self) -> (String, Values) {
        self.query.build(PostgresQueryBuilder)
    }

    /// Execute the query and return all results
    pub fn all<Ex: LifeExecutor + ?Sized>(self, executor: &Ex) -> Result<Vec<E::Model>, LifeError>
    where
        E::Model: FromRow,
    {
        let (sql, values) = self.to_sql();

        with_converted_params(&values, |params| {
            let rows = executor.query_all(&sql, params)?;

            let mut results = Vec::with_capacity(rows.len());
            for row in rows {
                let model = <E::Model as FromRow>::from_row(&row)
                    .map_err(|e| LifeError::ParseError(format!("Failed to parse row: {}", e)))?;
                results.push(model);
            }
            Ok(results)
        })
    }
}

impl<E: LifeModelTrait> Default for SelectQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}
