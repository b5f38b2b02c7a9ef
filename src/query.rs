use crate::user::models::UserRole;
use serde::Deserialize;

/// Case-insensitive substring match used by the in-memory listings and the
/// public store search. An empty needle matches everything, mirroring the
/// absent-filter behavior of the persistence layer.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sortable user columns. Caller-supplied sort fields deserialize into this
/// closed set; anything else is rejected before it can reach a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSortField {
    #[default]
    Name,
    Email,
    Role,
    CreatedAt,
}

impl UserSortField {
    pub fn column(self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::Role => "role",
            UserSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSortField {
    #[default]
    Name,
    Email,
    CreatedAt,
}

impl StoreSortField {
    pub fn column(self) -> &'static str {
        match self {
            StoreSortField::Name => "name",
            StoreSortField::Email => "email",
            StoreSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default)]
    pub sort_by: UserSortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub sort_by: StoreSortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSearch {
    pub search: Option<String>,
}
