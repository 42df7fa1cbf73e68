//! Predicate → SQL rendering
//!
//! A `PageRequest` becomes exactly one parameterised `SELECT` against the
//! `documents` table. Every user-supplied value is bound as a parameter;
//! only placeholders and fixed column names are spliced into the text.
//!
//! A set constraint binds its whole set as one JSON array expanded by
//! `json_each`, so the number of bound variables does not grow with the set
//! and SQLite's variable limit is never reached.

use rusqlite::types::Value;
use signet_core::model::RelationKind;
use signet_core::pager::{PageRequest, SortOrder};
use signet_core::predicate::Predicate;

pub(crate) const DOCUMENT_COLUMNS: &str =
    "d.id, d.phid, d.title, d.creator_phid, d.body_phid, d.version, d.created_at, d.updated_at";

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FetchStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Subquery yielding the members of one JSON array parameter
pub(crate) const SET_PARAM: &str = "SELECT value FROM json_each(?)";

/// Bind a set as a single JSON array parameter for `SET_PARAM`
pub(crate) fn set_param<T: Into<serde_json::Value>>(items: impl IntoIterator<Item = T>) -> Value {
    let array = serde_json::Value::Array(items.into_iter().map(Into::into).collect());
    Value::Text(array.to_string())
}

/// Render the single fetch statement for one page
///
/// Each contributor predicate adds its own inner join on `edges`, so two
/// contributor constraints must both hold. Whenever a join is present the
/// select is `DISTINCT`, so a document linked to several of the listed
/// contributors comes back once.
pub fn render_fetch(request: &PageRequest) -> FetchStatement {
    let mut joins = Vec::new();
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(cursor) = &request.after {
        let op = match cursor.order() {
            SortOrder::Ascending => ">",
            SortOrder::Descending => "<",
        };
        clauses.push(format!("d.id {} ?", op));
        params.push(Value::Integer(cursor.after_id()));
    }

    for predicate in request.filter.predicates() {
        match predicate {
            Predicate::Ids(ids) => {
                clauses.push(format!("d.id IN ({})", SET_PARAM));
                params.push(set_param(ids.iter().copied()));
            }
            Predicate::Phids(phids) => {
                clauses.push(format!("d.phid IN ({})", SET_PARAM));
                params.push(set_param(phids.iter().cloned()));
            }
            Predicate::CreatorPhids(phids) => {
                clauses.push(format!("d.creator_phid IN ({})", SET_PARAM));
                params.push(set_param(phids.iter().cloned()));
            }
            Predicate::ContributorPhids(phids) => {
                let alias = format!("e{}", joins.len());
                joins.push(format!("JOIN edges {a} ON {a}.src = d.phid", a = alias));
                clauses.push(format!(
                    "{a}.kind = ? AND {a}.dst IN ({})",
                    SET_PARAM,
                    a = alias
                ));
                params.push(Value::Integer(RelationKind::HasContributor.code()));
                params.push(set_param(phids.iter().cloned()));
            }
            Predicate::CreatedAfter(bound) => {
                clauses.push("d.created_at >= ?".to_string());
                params.push(Value::Integer(bound.timestamp()));
            }
            Predicate::CreatedBefore(bound) => {
                clauses.push("d.created_at <= ?".to_string());
                params.push(Value::Integer(bound.timestamp()));
            }
        }
    }

    let mut sql = format!(
        "SELECT {}{} FROM documents d",
        if joins.is_empty() { "" } else { "DISTINCT " },
        DOCUMENT_COLUMNS
    );
    for join in &joins {
        sql.push(' ');
        sql.push_str(join);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match request.order {
        SortOrder::Ascending => " ORDER BY d.id ASC",
        SortOrder::Descending => " ORDER BY d.id DESC",
    });
    sql.push_str(" LIMIT ?");
    params.push(Value::Integer(
        i64::try_from(request.fetch_limit()).unwrap_or(i64::MAX),
    ));

    FetchStatement { sql, params }
}
