//! Ordered, homogeneous, searchable collections of entities.
//!
//! [`ModelList`] is specialized per entity kind through the [`Model`] trait,
//! which names the fields a search may target and the attribute holding each
//! element's URL.

use std::fmt;
use std::ops::Index;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::assemble::{json_type, FromJson};
use crate::error::{BigsdbError, Result};
use crate::models::{Database, Locus, Resource, Scheme};

/// An entity kind that can be held in a [`ModelList`].
pub trait Model: FromJson + Clone + fmt::Debug + Send + Sync {
    /// Field names accepted by [`ModelList::search`].
    const FIELDS: &'static [&'static str];

    /// Field holding the element's link, if the kind has one.
    fn url_attribute() -> Option<&'static str>;

    /// Value of a searchable field. `None` when the field is unset.
    fn attribute(&self, field: &str) -> Option<&str>;

    /// Classification label compared by category searches.
    fn category_label(&self) -> Option<&str> {
        None
    }

    /// Wrap into the dynamically-typed [`Entity`].
    fn into_entity(self) -> Entity;

    /// Unwrap from an [`Entity`], handing it back if the kind differs.
    fn from_entity(entity: Entity) -> std::result::Result<Self, Entity>;
}

/// Any entity that can be stored in a collection, when the kind is only
/// known at runtime.
#[derive(Debug, Clone)]
pub enum Entity {
    Resource(Resource),
    Database(Database),
    Scheme(Scheme),
    Locus(Locus),
}

impl Entity {
    /// Name of the wrapped entity kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resource(_) => Resource::NAME,
            Self::Database(_) => Database::NAME,
            Self::Scheme(_) => Scheme::NAME,
            Self::Locus(_) => Locus::NAME,
        }
    }
}

/// Filter for [`ModelList::search`].
///
/// The pattern filter and the category filter narrow the same working set
/// one after the other. Empty strings are treated as absent.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    /// Value to match against the searched attribute.
    pub pattern: Option<String>,
    /// Keep only elements whose category label equals this.
    pub category: Option<String>,
    /// Compare whole values instead of substrings (ignored for regexes).
    pub exact_match: bool,
    /// Interpret `pattern` as a regular expression matched anywhere.
    pub use_regex: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            pattern: None,
            category: None,
            exact_match: true,
            use_regex: false,
        }
    }
}

impl SearchQuery {
    /// Exact match on `pattern`.
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Substring match on `pattern`.
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            exact_match: false,
            ..Self::default()
        }
    }

    /// Regular expression match on `pattern`.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            use_regex: true,
            ..Self::default()
        }
    }

    /// Category-only filter.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Add a category filter.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref().filter(|p| !p.is_empty())
    }

    fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether the query filters anything at all.
    pub fn is_active(&self) -> bool {
        self.pattern().is_some() || self.category_filter().is_some()
    }
}

/// An ordered collection holding a single entity kind.
#[derive(Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelList<T> {
    items: Vec<T>,
}

/// Resources of the root index.
pub type ResourceList = ModelList<Resource>;
/// Databases, usually flattened across resources.
pub type DatabaseList = ModelList<Database>;
/// Schemes of a sequence-definition database.
pub type SchemeList = ModelList<Scheme>;
/// Fully fetched loci.
pub type LocusList = ModelList<Locus>;

impl<T> Default for ModelList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Model> ModelList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Build from dynamically-typed entities.
    ///
    /// # Errors
    ///
    /// Fails with a shape error naming the expected kind if any entity is of
    /// another kind.
    pub fn from_entities(entities: Vec<Entity>) -> Result<Self> {
        entities
            .into_iter()
            .map(downcast::<T>)
            .collect::<Result<Vec<T>>>()
            .map(Self::new)
    }

    /// Build from a JSON array of entity objects.
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an array or any element cannot be built.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(values) => values
                .into_iter()
                .map(T::from_json)
                .collect::<Result<Vec<T>>>()
                .map(Self::new),
            other => Err(BigsdbError::shape(
                T::NAME,
                format!("collection must be built from a JSON array, got {}", json_type(&other)),
            )),
        }
    }

    /// Concatenate several collections in order.
    pub fn from_list_of_model_lists<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::new(lists.into_iter().flat_map(|list| list.items).collect())
    }

    /// Return the elements matching `query` on `field`.
    ///
    /// # Errors
    ///
    /// Fails if `field` is not searchable for this kind or the regex is invalid.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let cgmlst = schemes.search("description", &SearchQuery::regex("^cg"))?;
    /// ```
    pub fn search(&self, field: &str, query: &SearchQuery) -> Result<Self> {
        if !T::FIELDS.contains(&field) {
            return Err(BigsdbError::UnknownField {
                model: T::NAME,
                field: field.to_string(),
            });
        }

        let mut matched: Vec<&T> = self.items.iter().collect();

        if let Some(pattern) = query.pattern() {
            if query.use_regex {
                let regex = Regex::new(pattern)?;
                matched.retain(|item| item.attribute(field).is_some_and(|v| regex.is_match(v)));
            } else if query.exact_match {
                matched.retain(|item| item.attribute(field) == Some(pattern));
            } else {
                matched.retain(|item| item.attribute(field).is_some_and(|v| v.contains(pattern)));
            }
        }

        if let Some(category) = query.category_filter() {
            matched.retain(|item| item.category_label() == Some(category));
        }

        Ok(Self::new(matched.into_iter().cloned().collect()))
    }

    /// Links of every element, in order.
    ///
    /// # Errors
    ///
    /// Fails for kinds without a URL attribute (resources).
    pub fn get_urls(&self) -> Result<Vec<&str>> {
        let field = T::url_attribute().ok_or(BigsdbError::NoUrlAttribute(T::NAME))?;
        Ok(self
            .items
            .iter()
            .filter_map(|item| item.attribute(field))
            .collect())
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(BigsdbError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Replace the element at `index` with a dynamically-typed entity.
    ///
    /// The collection is left untouched if the kind or index is wrong.
    pub fn set_entity(&mut self, index: usize, entity: Entity) -> Result<T> {
        let value = downcast::<T>(entity)?;
        self.set(index, value)
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(BigsdbError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn append(&mut self, value: T) {
        self.items.push(value);
    }

    /// Append a dynamically-typed entity; rejected before mutation on kind mismatch.
    pub fn append_entity(&mut self, entity: Entity) -> Result<()> {
        let value = downcast::<T>(entity)?;
        self.items.push(value);
        Ok(())
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.items.extend(values);
    }

    /// Append several dynamically-typed entities; all are checked before any is added.
    pub fn extend_entities(&mut self, entities: Vec<Entity>) -> Result<()> {
        let values = entities
            .into_iter()
            .map(downcast::<T>)
            .collect::<Result<Vec<T>>>()?;
        self.items.extend(values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

fn downcast<T: Model>(entity: Entity) -> Result<T> {
    T::from_entity(entity).map_err(|other| {
        BigsdbError::shape(
            T::NAME,
            format!("expected a {} entity, got {}", T::NAME, other.kind()),
        )
    })
}

impl<T: Model> fmt::Debug for ModelList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{}List", T::NAME);
        let mut tuple = f.debug_tuple(&name);
        for item in &self.items {
            tuple.field(item);
        }
        tuple.finish()
    }
}

impl<T> Index<usize> for ModelList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IntoIterator for ModelList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ModelList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Model> FromIterator<T> for ModelList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database(name: &str, description: &str) -> Database {
        Database::from_json(json!({
            "name": name,
            "description": description,
            "href": format!("https://rest.pubmlst.org/db/{name}"),
        }))
        .unwrap()
    }

    fn scheme(id: u32, description: &str) -> Scheme {
        Scheme::from_json(json!({
            "scheme": format!("https://rest.pubmlst.org/db/pubmlst_test_seqdef/schemes/{id}"),
            "description": description,
        }))
        .unwrap()
    }

    fn sample_databases() -> DatabaseList {
        ModelList::new(vec![
            database("pubmlst_neisseria_seqdef", "Neisseria sequence/profile definitions"),
            database("pubmlst_neisseria_isolates", "Neisseria isolates"),
            database("pubmlst_achromobacter_seqdef", "Achromobacter sequence/profile definitions"),
        ])
    }

    #[test]
    fn test_from_json_preserves_order() {
        let list = DatabaseList::from_json(json!([
            {"name": "b_seqdef", "description": "B", "href": "https://x/b"},
            {"name": "a_seqdef", "description": "A", "href": "https://x/a"},
            {"name": "c_isolates", "description": "C", "href": "https://x/c"},
        ]))
        .unwrap();

        assert_eq!(list.len(), 3);
        let names: Vec<&str> = list.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["b_seqdef", "a_seqdef", "c_isolates"]);
    }

    #[test]
    fn test_from_json_rejects_object() {
        let err = DatabaseList::from_json(json!({"databases": []})).unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_search_exact_match() {
        let dbs = sample_databases();
        let found = dbs
            .search("name", &SearchQuery::exact("pubmlst_neisseria_seqdef"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "pubmlst_neisseria_seqdef");

        let none = dbs.search("name", &SearchQuery::exact("neisseria")).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_substring() {
        let dbs = sample_databases();
        let found = dbs.search("name", &SearchQuery::contains("neisseria")).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.name.contains("neisseria")));
    }

    #[test]
    fn test_search_regex_matches_anywhere() {
        let schemes = ModelList::new(vec![
            scheme(1, "MLST"),
            scheme(2, "cgMLST v2"),
            scheme(3, "Ribosomal cgMLST"),
        ]);
        let found = schemes
            .search("description", &SearchQuery::regex(r"^cg"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "cgMLST v2");

        let found = schemes
            .search("description", &SearchQuery::regex("cgMLST"))
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_search_category_narrows_pattern_results() {
        let dbs = sample_databases();
        let query = SearchQuery::contains("neisseria").with_category("seqdef");
        let found = dbs.search("name", &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "pubmlst_neisseria_seqdef");

        let only_category = dbs.search("name", &SearchQuery::category("isolates")).unwrap();
        assert_eq!(only_category.len(), 1);
    }

    #[test]
    fn test_search_without_filters_returns_everything() {
        let dbs = sample_databases();
        let found = dbs.search("subject", &SearchQuery::default()).unwrap();
        assert_eq!(found, dbs);
    }

    #[test]
    fn test_search_unknown_field() {
        let err = sample_databases()
            .search("colour", &SearchQuery::exact("x"))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, BigsdbError::UnknownField { .. }));
    }

    #[test]
    fn test_search_invalid_regex() {
        let err = sample_databases()
            .search("name", &SearchQuery::regex("("))
            .unwrap_err();
        assert!(matches!(err, BigsdbError::InvalidPattern(_)));
    }

    #[test]
    fn test_from_list_of_model_lists() {
        let first = sample_databases();
        let second = ModelList::new(vec![database("pubmlst_bordetella_seqdef", "Bordetella")]);
        let merged = DatabaseList::from_list_of_model_lists(vec![first.clone(), second.clone()]);

        assert_eq!(merged.len(), first.len() + second.len());
        assert_eq!(merged.as_slice()[..3], first.as_slice()[..]);
        assert_eq!(merged[3], second[0]);
    }

    #[test]
    fn test_get_urls() {
        let dbs = sample_databases();
        let urls = dbs.get_urls().unwrap();
        assert_eq!(urls[0], "https://rest.pubmlst.org/db/pubmlst_neisseria_seqdef");
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn test_get_urls_fails_for_resources() {
        let resources = ResourceList::default();
        let err = resources.get_urls().unwrap_err();
        assert!(matches!(err, BigsdbError::NoUrlAttribute("Resource")));
    }

    #[test]
    fn test_positional_access() {
        let mut dbs = sample_databases();
        let replacement = database("pubmlst_other_isolates", "Other isolates");

        let old = dbs.set(1, replacement.clone()).unwrap();
        assert_eq!(old.name, "pubmlst_neisseria_isolates");
        assert_eq!(dbs[1], replacement);

        let removed = dbs.remove(0).unwrap();
        assert_eq!(removed.name, "pubmlst_neisseria_seqdef");
        assert_eq!(dbs.len(), 2);

        let err = dbs.remove(5).unwrap_err();
        assert!(matches!(err, BigsdbError::IndexOutOfRange { index: 5, len: 2 }));
        assert!(dbs.set(2, replacement).is_err());
        assert!(dbs.get(2).is_none());
    }

    #[test]
    fn test_from_entities() {
        let dbs = DatabaseList::from_entities(vec![
            database("x_seqdef", "X").into_entity(),
            database("y_isolates", "Y").into_entity(),
        ])
        .unwrap();
        assert_eq!(dbs.len(), 2);
        assert_eq!(dbs[1].name, "y_isolates");

        let err = DatabaseList::from_entities(vec![
            database("x_seqdef", "X").into_entity(),
            scheme(1, "MLST").into_entity(),
        ])
        .unwrap_err();
        assert!(err.is_shape());
        assert!(err.to_string().contains("expected a Database entity, got Scheme"));
    }

    #[test]
    fn test_append_entity_rejects_other_kind() {
        let mut dbs = sample_databases();
        let before = dbs.clone();

        let err = dbs.append_entity(scheme(1, "MLST").into_entity()).unwrap_err();
        assert!(err.is_shape());
        assert!(err.to_string().contains("expected a Database entity, got Scheme"));
        assert_eq!(dbs, before);

        dbs.append_entity(database("x_seqdef", "X").into_entity())
            .unwrap();
        assert_eq!(dbs.len(), before.len() + 1);
    }

    #[test]
    fn test_extend_entities_is_all_or_nothing() {
        let mut dbs = sample_databases();
        let err = dbs
            .extend_entities(vec![
                database("x_seqdef", "X").into_entity(),
                scheme(2, "cgMLST").into_entity(),
            ])
            .unwrap_err();
        assert!(err.is_shape());
        assert_eq!(dbs.len(), 3);
    }

    #[test]
    fn test_set_entity_rejects_other_kind() {
        let mut schemes = ModelList::new(vec![scheme(1, "MLST")]);
        let err = schemes
            .set_entity(0, database("x", "X").into_entity())
            .unwrap_err();
        assert!(err.is_shape());
        assert_eq!(schemes[0].description, "MLST");
    }

    #[test]
    fn test_debug_lists_elements() {
        let schemes = ModelList::new(vec![scheme(1, "MLST"), scheme(2, "cgMLST")]);
        let debug = format!("{:?}", schemes);
        assert!(debug.starts_with("SchemeList("));
        assert!(debug.contains("cgMLST"));
    }

    #[test]
    fn test_serializes_as_array() {
        let value = serde_json::to_value(sample_databases()).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["category"], "seqdef");
    }
}
