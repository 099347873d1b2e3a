//! Read-only PostgREST query builder.
//!
//! Covers the three read shapes the lookup needs: equality filters,
//! case-insensitive "contains" filters and embedded (joined) relations,
//! each optionally ordered and capped.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    Eq { column: String, value: String },
    ILikeContains { column: String, value: String },
}

impl Filter {
    fn render(&self) -> String {
        match self {
            Filter::Eq { column, value } => {
                format!("{}=eq.{}", column, urlencoding::encode(value))
            }
            // PostgREST accepts `*` as the LIKE wildcard in query strings
            Filter::ILikeContains { column, value } => {
                format!("{}=ilike.{}", column, urlencoding::encode(&format!("*{}*", value)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: String,
    select: String,
    filters: Vec<Filter>,
    order: Option<(String, Order)>,
    limit: Option<usize>,
}

impl TableQuery {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Column list, including embedded relations such as `doctor:doctors(*)`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = columns.split_whitespace().collect::<Vec<_>>().join("");
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn ilike_contains(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::ILikeContains {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn to_path(&self) -> String {
        let mut params = vec![format!("select={}", urlencoding::encode(&self.select))];
        params.extend(self.filters.iter().map(Filter::render));

        if let Some((column, order)) = &self.order {
            params.push(format!("order={}.{}", column, order.as_str()));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }

        format!("/rest/v1/{}?{}", self.table, params.join("&"))
    }
}

impl fmt::Display for TableQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
