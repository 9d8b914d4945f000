//! # PostgREST Query Builder
//!
//! Builds the `?select=...&col=op.value&order=...` query pairs PostgREST
//! expects. Pairs are kept in insertion order and handed to reqwest, which
//! does the URL encoding.
//!
//! ```text
//! Query::select("id,name")
//!     .gte("created_at", "2025-01-01T03:00:00Z")   → created_at=gte.2025-01-01T03:00:00Z
//!     .lt("created_at", "2025-01-02T03:00:00Z")    → created_at=lt.2025-01-02T03:00:00Z
//!     .order_desc("created_at")                    → order=created_at.desc
//! ```

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn select(columns: impl Into<String>) -> Self {
        Query::new().param("select", columns)
    }

    /// Adds a raw pair.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    fn filter(self, column: &str, op: &str, value: impl AsRef<str>) -> Self {
        let value = format!("{op}.{}", value.as_ref());
        self.param(column, value)
    }

    pub fn eq(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lt(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "lt", value)
    }

    /// Case-insensitive substring match.
    pub fn ilike_contains(self, column: &str, needle: &str) -> Self {
        self.filter(column, "ilike", format!("%{needle}%"))
    }

    /// Adds `column=eq.value` only when `value` is set.
    pub fn eq_opt(self, column: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.param("order", format!("{column}.asc"))
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.param("order", format!("{column}.desc"))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of the first pair with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
