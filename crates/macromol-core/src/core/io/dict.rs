use std::str::FromStr;

/// Value meaning "unknown".
pub const UNKNOWN: &str = "?";
/// Value meaning "inapplicable".
pub const INAPPLICABLE: &str = ".";

/// Whether a stored value is one of the two mmCIF null sentinels.
pub fn is_null(value: &str) -> bool {
    value == UNKNOWN || value == INAPPLICABLE
}

/// One table of the dictionary: an ordered set of keys and rows of string values.
///
/// Every row has exactly one value per key. Values are kept verbatim, including the `?` and
/// `.` sentinels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Category {
    keys: Vec<String>,
    rows: Vec<Vec<String>>,
    looped: bool,
}

impl Category {
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            looped: false,
        }
    }

    /// A category that is written as a `loop_` even when it has a single row.
    pub fn looped<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            looped: true,
            ..Self::new(keys)
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    pub fn column(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Adds a key if absent, filling existing rows with `?`. Returns its column.
    pub fn ensure_key(&mut self, key: &str) -> usize {
        if let Some(index) = self.column(key) {
            return index;
        }
        self.keys.push(key.to_string());
        for row in &mut self.rows {
            row.push(UNKNOWN.to_string());
        }
        self.keys.len() - 1
    }

    /// Appends a row given in key order; short rows are padded with `?`, long rows truncated.
    pub fn push_row(&mut self, mut values: Vec<String>) {
        values.resize(self.keys.len(), UNKNOWN.to_string());
        self.rows.push(values);
    }

    /// Appends a row from key/value pairs, adding any keys the category doesn't have yet.
    pub fn push_pairs<K: AsRef<str>, V: Into<String>>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) {
        let mut row = vec![UNKNOWN.to_string(); self.keys.len()];
        for (key, value) in pairs {
            let index = self.ensure_key(key.as_ref());
            if index >= row.len() {
                row.resize(index + 1, UNKNOWN.to_string());
            }
            row[index] = value.into();
        }
        row.resize(self.keys.len(), UNKNOWN.to_string());
        self.rows.push(row);
    }

    /// Sets one value, adding the key if needed. Out-of-range rows are ignored.
    pub fn set(&mut self, row: usize, key: &str, value: impl Into<String>) {
        if row >= self.rows.len() {
            return;
        }
        let index = self.ensure_key(key);
        self.rows[row][index] = value.into();
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            keys: &self.keys,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|values| Row {
            keys: &self.keys,
            values,
        })
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// A borrowed view of one row of a [`Category`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    keys: &'a [String],
    values: &'a [String],
}

impl<'a> Row<'a> {
    /// The raw value for `key`, sentinels included.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        let index = self.keys.iter().position(|k| k == key)?;
        self.values.get(index).map(String::as_str)
    }

    /// The value for `key`, or `None` when it is absent, `?` or `.`.
    pub fn defined(&self, key: &str) -> Option<&'a str> {
        self.get(key).filter(|v| !is_null(v))
    }

    /// The value for `key` parsed as `T`; absent, null and malformed values are `None`.
    pub fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.defined(key)?.trim().parse().ok()
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// The format-neutral representation shared by every reader and writer.
///
/// Categories keep the order in which they were first inserted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntermediateDict {
    name: String,
    categories: Vec<(String, Category)>,
}

impl IntermediateDict {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    /// The data block name (usually the entry id).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// The named category, created empty at the end if missing.
    pub fn entry(&mut self, name: &str) -> &mut Category {
        let index = match self.categories.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.categories.push((name.to_string(), Category::default()));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index].1
    }

    /// Inserts a category, replacing one of the same name in place.
    pub fn insert(&mut self, name: &str, category: Category) {
        match self.category_mut(name) {
            Some(existing) => *existing = category,
            None => self.categories.push((name.to_string(), category)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Category> {
        let index = self.categories.iter().position(|(n, _)| n == name)?;
        Some(self.categories.remove(index).1)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Rows of a category; a missing category yields no rows.
    pub fn rows<'a>(&'a self, name: &str) -> impl Iterator<Item = Row<'a>> + use<'a> {
        self.category(name).into_iter().flat_map(Category::rows)
    }

    /// The first row's raw value for `category.key`, if any.
    pub fn first(&self, category: &str, key: &str) -> Option<&str> {
        self.category(category)?.row(0)?.get(key)
    }

    /// The first row's value for `category.key`, ignoring null sentinels.
    pub fn first_defined(&self, category: &str, key: &str) -> Option<&str> {
        self.first(category, key).filter(|v| !is_null(v))
    }
}
