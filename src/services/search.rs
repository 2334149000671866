use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

/// Narrow a query to rows whose `column` may contain `search_term`, using SQLite's LIKE operator.
///
/// LIKE only folds ASCII case, so the filter is applied for ASCII terms only and
/// other terms leave the query untouched. Either way the rows must still pass
/// [`name_matches`]. An empty term matches every row.
/// `%`, `_` and `\` in the term match literally.
pub fn apply_text_search<T, C>(
    query: sea_orm::Select<T>,
    column: C,
    search_term: &str,
) -> sea_orm::Select<T>
where
    T: EntityTrait,
    C: ColumnTrait,
{
    if search_term.is_empty() || !search_term.is_ascii() {
        return query;
    }

    let pattern = format!("%{}%", escape_like(search_term));
    query.filter(column.like(LikeExpr::new(pattern).escape('\\')))
}

/// Unicode case-insensitive substring match.
pub fn name_matches(name: &str, search_term: &str) -> bool {
    name.to_lowercase().contains(&search_term.to_lowercase())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
