//! Column definitions and sort state

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::row::{CellValue, TableRow};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active sort axis. `key == None` means unsorted: rows keep the
/// order they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: Option<String>,
    pub order: SortOrder,
}

impl SortSpec {
    /// No sorting.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(key: impl Into<String>, order: SortOrder) -> Self {
        Self {
            key: Some(key.into()),
            order,
        }
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// The state after a click on `key`'s header.
    ///
    /// A first click on any column sorts it ascending; repeated clicks on
    /// the same column flip the direction. There is no third click back to
    /// unsorted; once a column is chosen the table stays sorted.
    pub fn toggled(&self, key: &str) -> Self {
        if self.key.as_deref() == Some(key) {
            Self {
                key: self.key.clone(),
                order: self.order.flipped(),
            }
        } else {
            Self::by(key, SortOrder::Asc)
        }
    }
}

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Custom cell renderer: receives the cell value and the whole row, so a
/// renderer can combine columns (status badges, "name <email>", ...).
pub type RenderFn<R> = Arc<dyn Fn(&CellValue, &R) -> String + Send + Sync>;

/// One table column: which cell it reads, how it is labelled, and
/// optionally how its cells are rendered.
#[derive(Clone)]
pub struct Column<R> {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub align: Align,
    pub render: Option<RenderFn<R>>,
}

impl<R: TableRow> Column<R> {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            align: Align::default(),
            render: None,
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&CellValue, &R) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Cell text for `row`: the render function when present, otherwise the
    /// raw value's plain-text form.
    pub fn rendered(&self, row: &R) -> String {
        let value = row.cell(&self.key);
        match &self.render {
            Some(render) => render(&value, row),
            None => value.display(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("align", &self.align)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_toggle_sorts_ascending() {
        let unsorted = SortSpec::none();
        assert!(!unsorted.is_active());

        let spec = unsorted.toggled("name");
        assert_eq!(spec, SortSpec::by("name", SortOrder::Asc));
        assert!(spec.is_active());
    }

    #[test]
    fn repeated_toggles_flip_direction() {
        let spec = SortSpec::by("name", SortOrder::Asc).toggled("name");
        assert_eq!(spec, SortSpec::by("name", SortOrder::Desc));
        assert_eq!(spec.toggled("name"), SortSpec::by("name", SortOrder::Asc));
    }

    #[test]
    fn toggling_another_column_starts_ascending() {
        let spec = SortSpec::by("name", SortOrder::Desc).toggled("email");
        assert_eq!(spec, SortSpec::by("email", SortOrder::Asc));
    }

    #[test]
    fn sort_order_parses_from_query_strings() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn builders_override_the_column_defaults() {
        let column: Column<serde_json::Value> = Column::new("age", "Age")
            .sortable(false)
            .align(Align::Right);
        assert!(!column.sortable);
        assert_eq!(column.align, Align::Right);

        let plain: Column<serde_json::Value> = Column::new("name", "Name");
        assert!(plain.sortable);
        assert_eq!(plain.align, Align::Left);
    }

    #[test]
    fn rendered_falls_back_to_plain_text() {
        let column: Column<serde_json::Value> = Column::new("name", "Name");
        let row = json!({"name": "Alice"});
        assert_eq!(column.rendered(&row), "Alice");
    }

    #[test]
    fn rendered_uses_the_render_function() {
        let column: Column<serde_json::Value> = Column::new("status", "Status")
            .with_render(|value, row: &serde_json::Value| {
                format!("{} ({})", value.display(), row.cell("role").display())
            });
        let row = json!({"status": "active", "role": "admin"});
        assert_eq!(column.rendered(&row), "active (admin)");
    }
}
