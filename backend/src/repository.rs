//! Generic data access over the relational store
//!
//! Tables describe themselves through [`Record`] (read side) and
//! [`NewRecord`] (insert side). The helpers here cover lookup by id or
//! column, paginated listing with parameterized filters, bulk insert and
//! delete. Column and table names only ever come from `&'static str`
//! constants; user input reaches SQL exclusively through bind parameters.

use std::fmt::Write;

use shared::{PaginatedResponse, Pagination};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::query_builder::Separated;
use sqlx::{Executor, FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};

/// A table row that can be read back
pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Comma separated select list
    const COLUMNS: &'static str;
}

/// A row to be inserted into the table of `Output`
pub trait NewRecord: Send {
    type Output: Record;
    const INSERT_COLUMNS: &'static [&'static str];

    /// Push one bind per entry of `INSERT_COLUMNS`, in order
    fn push_row(self, row: &mut Separated<'_, '_, Postgres, &'static str>);
}

/// Value bound into a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i64),
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        BindValue::Text(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Int(v)
    }
}

impl From<i16> for BindValue {
    fn from(v: i16) -> Self {
        BindValue::Int(i64::from(v))
    }
}

/// Parameterized WHERE clause built from AND-ed conditions
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_placeholder(&mut self, value: BindValue) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    /// `column = value`
    pub fn eq(mut self, column: &'static str, value: impl Into<BindValue>) -> Self {
        let placeholder = self.next_placeholder(value.into());
        self.conditions.push(format!("{} = {}", column, placeholder));
        self
    }

    /// Case-insensitive substring match of `term` against any of `columns`
    pub fn like_any(mut self, columns: &[&'static str], term: &str) -> Self {
        if columns.is_empty() {
            return self;
        }
        let placeholder = self.next_placeholder(BindValue::Text(like_pattern(term)));
        let group = columns
            .iter()
            .map(|c| format!("{} ILIKE {}", c, placeholder))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({})", group));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    /// ` WHERE ...` or an empty string
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Wrap a user term in `%...%`, escaping LIKE wildcards
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// ORDER BY column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    fn sql(&self) -> String {
        // id breaks ties so pages never overlap
        let dir = if self.descending { "DESC" } else { "ASC" };
        if self.column == "id" {
            format!(" ORDER BY id {}", dir)
        } else {
            format!(" ORDER BY {} {}, id {}", self.column, dir, dir)
        }
    }
}

fn bind_all_as<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    binds: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(s) => query.bind(s.as_str()),
            BindValue::Int(i) => query.bind(*i),
        };
    }
    query
}

fn bind_all_scalar<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    binds: &'q [BindValue],
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(s) => query.bind(s.as_str()),
            BindValue::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Build the SELECT used by [`list`]; exposed for tests
pub fn list_sql<T: Record>(filter: &Filter, order: OrderBy, bind_offset: usize) -> AppResult<String> {
    let mut sql = format!("SELECT {} FROM {}{}{}", T::COLUMNS, T::TABLE, filter.where_clause(), order.sql());
    write!(sql, " LIMIT ${} OFFSET ${}", bind_offset + 1, bind_offset + 2)
        .map_err(|_| AppError::Internal("Failed to write LIMIT clause to query".to_string()))?;
    Ok(sql)
}

/// Fetch a record by primary key
pub async fn find_by_id<T: Record>(db: &PgPool, id: i64) -> AppResult<Option<T>> {
    let sql = format!("SELECT {} FROM {} WHERE id = $1", T::COLUMNS, T::TABLE);
    let record = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(db).await?;
    Ok(record)
}

/// Fetch the first record whose `column` equals `value`
pub async fn find_one_by<T: Record>(
    db: &PgPool,
    column: &'static str,
    value: impl Into<BindValue>,
) -> AppResult<Option<T>> {
    let filter = Filter::new().eq(column, value);
    let sql = format!("SELECT {} FROM {}{} LIMIT 1", T::COLUMNS, T::TABLE, filter.where_clause());
    let record = bind_all_as(sqlx::query_as::<_, T>(&sql), filter.binds())
        .fetch_optional(db)
        .await?;
    Ok(record)
}

/// Fetch every record whose `column` equals `value`, oldest first
pub async fn find_all_by<T: Record>(
    db: &PgPool,
    column: &'static str,
    value: impl Into<BindValue>,
) -> AppResult<Vec<T>> {
    let filter = Filter::new().eq(column, value);
    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY id ASC",
        T::COLUMNS,
        T::TABLE,
        filter.where_clause()
    );
    let records = bind_all_as(sqlx::query_as::<_, T>(&sql), filter.binds())
        .fetch_all(db)
        .await?;
    Ok(records)
}

/// Every record matching the filter, unpaginated
pub async fn find_all<T: Record>(db: &PgPool, filter: &Filter, order: OrderBy) -> AppResult<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {}{}{}",
        T::COLUMNS,
        T::TABLE,
        filter.where_clause(),
        order.sql()
    );
    let records = bind_all_as(sqlx::query_as::<_, T>(&sql), filter.binds())
        .fetch_all(db)
        .await?;
    Ok(records)
}

/// Whether any record matches the filter
pub async fn exists<T: Record>(db: &PgPool, filter: &Filter) -> AppResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {}{})",
        T::TABLE,
        filter.where_clause()
    );
    let found = bind_all_scalar(sqlx::query_scalar::<_, bool>(&sql), filter.binds())
        .fetch_one(db)
        .await?;
    Ok(found)
}

/// Whether any record has `column` equal to `value`
pub async fn exists_by<T: Record>(
    db: &PgPool,
    column: &'static str,
    value: impl Into<BindValue>,
) -> AppResult<bool> {
    exists::<T>(db, &Filter::new().eq(column, value)).await
}

/// Count records matching the filter
pub async fn count<T: Record>(db: &PgPool, filter: &Filter) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}{}", T::TABLE, filter.where_clause());
    let total = bind_all_scalar(sqlx::query_scalar::<_, i64>(&sql), filter.binds())
        .fetch_one(db)
        .await?;
    Ok(total)
}

/// One page of records matching the filter, with the total count
pub async fn list<T: Record>(
    db: &PgPool,
    filter: &Filter,
    order: OrderBy,
    pagination: Pagination,
) -> AppResult<PaginatedResponse<T>> {
    let total = count::<T>(db, filter).await?;

    let sql = list_sql::<T>(filter, order, filter.binds().len())?;
    let rows = bind_all_as(sqlx::query_as::<_, T>(&sql), filter.binds())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

    Ok(PaginatedResponse::new(
        rows,
        pagination,
        u64::try_from(total).unwrap_or_default(),
    ))
}

/// Insert many rows in one statement, returning the stored records
pub async fn bulk_insert<'c, N, E>(executor: E, rows: Vec<N>) -> AppResult<Vec<N::Output>>
where
    N: NewRecord,
    E: Executor<'c, Database = Postgres>,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        N::Output::TABLE,
        N::INSERT_COLUMNS.join(", ")
    ));
    builder.push_values(rows, |mut row, record| record.push_row(&mut row));
    builder.push(" RETURNING ");
    builder.push(N::Output::COLUMNS);

    let created = builder
        .build_query_as::<N::Output>()
        .fetch_all(executor)
        .await?;
    Ok(created)
}

/// Delete a record by primary key; returns whether a row was removed
pub async fn delete_by_id<'c, T, E>(executor: E, id: i64) -> AppResult<bool>
where
    T: Record,
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

/// Delete every record whose `column` equals `value`
pub async fn delete_by<'c, T, E>(executor: E, column: &'static str, value: i64) -> AppResult<u64>
where
    T: Record,
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, column);
    let result = sqlx::query(&sql).bind(value).execute(executor).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(sqlx::FromRow)]
    #[allow(dead_code)]
    struct Widget {
        id: i64,
        name: String,
    }

    impl Record for Widget {
        const TABLE: &'static str = "widgets";
        const COLUMNS: &'static str = "id, name";
    }

    #[test]
    fn empty_filter_has_no_where() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.where_clause(), "");
    }

    #[test]
    fn placeholders_are_numbered_in_order() {
        let filter = Filter::new()
            .eq("is_verified", 2i16)
            .eq("region", "Hhohho")
            .like_any(&["name", "town"], "bakery");
        assert_eq!(
            filter.where_clause(),
            " WHERE is_verified = $1 AND region = $2 AND (name ILIKE $3 OR town ILIKE $3)"
        );
        assert_eq!(
            filter.binds(),
            &[
                BindValue::Int(2),
                BindValue::Text("Hhohho".into()),
                BindValue::Text("%bakery%".into()),
            ]
        );
    }

    #[test]
    fn like_any_without_columns_is_noop() {
        let filter = Filter::new().like_any(&[], "x");
        assert!(filter.is_empty());
        assert!(filter.binds().is_empty());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn list_sql_appends_paging_after_filter_binds() {
        let filter = Filter::new().eq("region", "Manzini");
        let sql = list_sql::<Widget>(&filter, OrderBy::desc("id"), filter.binds().len()).unwrap();
        assert_eq!(
            sql,
            "SELECT id, name FROM widgets WHERE region = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn non_id_order_breaks_ties_by_id() {
        let sql = list_sql::<Widget>(&Filter::new(), OrderBy::asc("name"), 0).unwrap();
        assert_eq!(
            sql,
            "SELECT id, name FROM widgets ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
        );
    }
}
