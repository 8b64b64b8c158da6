// ==========================================
// Foundry QC Tracker - dynamic filter builder
// ==========================================
// Collects optional WHERE clauses with their bound parameters.
// Clauses are static SQL fragments; values are always bound.
// ==========================================

use rusqlite::types::ToSql;

#[derive(Default)]
pub struct FilterBuilder {
    clauses: Vec<&'static str>,
    params: Vec<Box<dyn ToSql>>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `clause` (with one `?` placeholder) when `value` is present
    pub fn and_opt<T: ToSql + 'static>(&mut self, clause: &'static str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(clause);
            self.params.push(Box::new(v));
        }
        self
    }

    /// Add a clause with one bound value
    pub fn and<T: ToSql + 'static>(&mut self, clause: &'static str, value: T) -> &mut Self {
        self.clauses.push(clause);
        self.params.push(Box::new(value));
        self
    }

    /// Add a clause with two placeholders
    pub fn and_pair<A, B>(&mut self, clause: &'static str, first: A, second: B) -> &mut Self
    where
        A: ToSql + 'static,
        B: ToSql + 'static,
    {
        self.clauses.push(clause);
        self.params.push(Box::new(first));
        self.params.push(Box::new(second));
        self
    }

    /// " WHERE a = ? AND b = ?" or ""
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Bound parameters followed by extra values (LIMIT / OFFSET)
    pub fn params_with<'a>(&'a self, extra: &'a [&'a dyn ToSql]) -> Vec<&'a dyn ToSql> {
        let mut all = self.params();
        all.extend_from_slice(extra);
        all
    }
}

/// Escape LIKE wildcards; pair with `ESCAPE '\\'`
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder() {
        let b = FilterBuilder::new();
        assert_eq!(b.where_sql(), "");
        assert!(b.params().is_empty());
    }

    #[test]
    fn test_optional_clauses() {
        let mut b = FilterBuilder::new();
        b.and_opt("furnace_id = ?", Some(2i64))
            .and_opt("decision = ?", None::<String>)
            .and("test_date >= ?", "2025-01-01".to_string());
        assert_eq!(b.where_sql(), " WHERE furnace_id = ? AND test_date >= ?");
        assert_eq!(b.params().len(), 2);
        assert_eq!(b.params_with(&[&10i64, &0i64]).len(), 4);
    }

    #[test]
    fn test_pair_clause_binds_both_values() {
        let mut b = FilterBuilder::new();
        b.and_pair("(a LIKE ? OR b LIKE ?)", "%x%".to_string(), "%x%".to_string());
        assert_eq!(b.where_sql(), " WHERE (a LIKE ? OR b LIKE ?)");
        assert_eq!(b.params().len(), 2);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }
}
