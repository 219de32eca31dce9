//! List query: search text, ordering and page request.

use std::cmp::Ordering;

use models::User;

use crate::pagination::PageRequest;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    Name,
    Email,
    #[default]
    CreatedAt,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortField {
    /// Unknown or missing values map to the default.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("name") => SortField::Name,
            Some(s) if s.eq_ignore_ascii_case("email") => SortField::Email,
            _ => SortField::CreatedAt,
        }
    }
}

impl SortOrder {
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub page: PageRequest,
    pub search: String,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl UserQuery {
    /// Lower-cased search needle, or `None` when the search is empty.
    /// Whitespace is part of the needle.
    pub fn needle(&self) -> Option<String> {
        (!self.search.is_empty()).then(|| self.search.to_lowercase())
    }

    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let primary = match self.sort_by {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Email => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let ord = primary.then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    /// Filter by search text and sort; pagination is applied by the caller.
    pub fn select(&self, users: Vec<User>) -> Vec<User> {
        let mut selected: Vec<User> = match self.needle() {
            Some(needle) => users.into_iter().filter(|u| u.matches_search(&needle)).collect(),
            None => users,
        };
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }
}
