//! crates/digital_library_core/src/catalog.rs
//!
//! Catalog browsing: the category list and the two independent filters
//! (category and free text) that narrow it down.

use crate::domain::Resource;

/// The category entry that matches every resource.
pub const ALL_CATEGORIES: &str = "Todos";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    /// Builds a filter from a selector value; missing, empty and `Todos` select everything.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection.map(str::trim) {
            None | Some("") => CategoryFilter::All,
            Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(category) => CategoryFilter::Exact(category.to_string()),
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exact(category) => resource.category == *category,
        }
    }
}

/// Case-insensitive substring search over title and author.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.needle.is_empty()
            || resource.title.to_lowercase().contains(&self.needle)
            || resource.author.to_lowercase().contains(&self.needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub text: TextFilter,
}

impl CatalogQuery {
    pub fn new(category: Option<&str>, text: Option<&str>) -> Self {
        Self {
            category: CategoryFilter::from_selection(category),
            text: TextFilter::new(text.unwrap_or_default()),
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.category.matches(resource) && self.text.matches(resource)
    }

    pub fn apply<'a, I>(&self, resources: I) -> Vec<&'a Resource>
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        resources.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// `Todos` followed by each distinct category in catalog order.
pub fn categories(resources: &[Resource]) -> Vec<String> {
    let mut list = vec![ALL_CATEGORIES.to_string()];
    for resource in resources {
        if !list.iter().skip(1).any(|c| *c == resource.category) {
            list.push(resource.category.clone());
        }
    }
    list
}
