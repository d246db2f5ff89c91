//! Sort keys and directions for contact listings.

use serde::{Deserialize, Serialize};

/// Field a contact listing can be ordered by.
///
/// Wire names match the JSON field names of a contact (`createdAt`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Name,
    Email,
    Phone,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Every sortable field, in the order the UI offers them.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// Resolve a query-string value, falling back to the default sort key
    /// for missing or unrecognized input.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("invalid sort field: {s}"))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Resolve a query-string value. Anything other than `asc` sorts
    /// descending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Asc)
    }
}

/// A sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ContactSort {
    #[must_use]
    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_from_param() {
        assert_eq!(SortField::from_param(Some("name")), SortField::Name);
        assert_eq!(SortField::from_param(Some("updatedAt")), SortField::UpdatedAt);
        assert_eq!(SortField::from_param(None), SortField::CreatedAt);
    }

    #[test]
    fn test_sort_field_unknown_falls_back() {
        assert_eq!(SortField::from_param(Some("password")), SortField::CreatedAt);
        assert_eq!(SortField::from_param(Some("NAME")), SortField::CreatedAt);
        assert_eq!(SortField::from_param(Some("")), SortField::CreatedAt);
    }

    #[test]
    fn test_sort_field_wire_name_roundtrip() {
        for field in SortField::ALL {
            assert_eq!(field.as_str().parse::<SortField>().unwrap(), field);
        }
    }

    #[test]
    fn test_sort_order_from_param() {
        assert_eq!(SortOrder::from_param(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(None), SortOrder::Desc);
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let sort = ContactSort::default();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert!(!sort.order.is_ascending());
    }
}
