//! Listing filters, sorting and pagination.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use rentaldesk_core::{DomainError, DomainResult};

use crate::{PropertyRecord, PropertyStatus, PropertyType};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Query-string parameters exactly as received. Blank values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl RawListQuery {
    pub fn parse(&self) -> DomainResult<(ListQuery, PageRequest)> {
        let page = match non_blank(&self.page) {
            Some(v) => parse_number::<usize>(v, "page")?,
            None => DEFAULT_PAGE,
        };
        let limit = match non_blank(&self.limit) {
            Some(v) => parse_number::<usize>(v, "limit")?,
            None => DEFAULT_PAGE_LIMIT,
        };
        let paging = PageRequest::new(page, limit)?;

        let sort = match non_blank(&self.sort_by) {
            Some(field) => Some(SortSpec {
                field: field.parse::<SortField>()?,
                order: non_blank(&self.sort_order).map(str::parse::<SortOrder>).transpose()?.unwrap_or(SortOrder::Desc),
            }),
            None => None,
        };

        let query = ListQuery {
            status: non_blank(&self.status).map(EnumFilter::<PropertyStatus>::parse),
            property_type: non_blank(&self.property_type).map(EnumFilter::<PropertyType>::parse),
            city: non_blank(&self.city).map(str::to_lowercase),
            min_rent: non_blank(&self.min_rent).map(|v| parse_rent(v, "minRent")).transpose()?,
            max_rent: non_blank(&self.max_rent).map(|v| parse_rent(v, "maxRent")).transpose()?,
            sort,
        };

        Ok((query, paging))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_number<T: core::str::FromStr>(value: &str, name: &str) -> DomainResult<T> {
    value
        .parse::<T>()
        .map_err(|_| DomainError::validation(format!("{name} must be a number")))
}

fn parse_rent(value: &str, name: &str) -> DomainResult<f64> {
    let v = parse_number::<f64>(value, name)?;
    if !v.is_finite() {
        return Err(DomainError::validation(format!("{name} must be a finite number")));
    }
    Ok(v)
}

/// Filter on an enumerated field.
///
/// Values are matched case-insensitively; a value outside the enum is kept as
/// `Unknown` and matches no record instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFilter<T> {
    Is(T),
    Unknown,
}

impl<T: core::str::FromStr + PartialEq + Copy> EnumFilter<T> {
    pub fn parse(value: &str) -> Self {
        value.parse::<T>().map_or(Self::Unknown, Self::Is)
    }

    pub fn accepts(&self, value: T) -> bool {
        matches!(self, Self::Is(v) if *v == value)
    }
}

/// 1-indexed page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> DomainResult<Self> {
        if page == 0 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    MonthlyRent,
    Area,
}

impl core::str::FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "monthlyRent" => Ok(SortField::MonthlyRent),
            "area" => Ok(SortField::Area),
            _ => Err(DomainError::validation(
                "sortBy must be one of: createdAt, updatedAt, monthlyRent, area",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl core::str::FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DomainError::validation("sortOrder must be asc or desc")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    fn compare(&self, a: &PropertyRecord, b: &PropertyRecord) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::MonthlyRent => a.monthly_rent.total_cmp(&b.monthly_rent),
            SortField::Area => a.area.total_cmp(&b.area),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Independently optional filters, composed with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub status: Option<EnumFilter<PropertyStatus>>,
    pub property_type: Option<EnumFilter<PropertyType>>,
    /// Lower-cased substring matched against the city.
    pub city: Option<String>,
    /// Inclusive lower bound on `monthly_rent`.
    pub min_rent: Option<f64>,
    /// Inclusive upper bound on `monthly_rent`.
    pub max_rent: Option<f64>,
    /// `None` keeps insertion order.
    pub sort: Option<SortSpec>,
}

impl ListQuery {
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.status.is_none_or(|s| s.accepts(record.status))
            && self.property_type.is_none_or(|t| t.accepts(record.property_type))
            && self
                .city
                .as_deref()
                .is_none_or(|c| record.city.to_lowercase().contains(c))
            && self.min_rent.is_none_or(|min| record.monthly_rent >= min)
            && self.max_rent.is_none_or(|max| record.monthly_rent <= max)
    }

    /// Filter, sort (stable), then slice `records` for `paging`.
    pub fn apply<'a, I>(&self, records: I, paging: PageRequest) -> Page<PropertyRecord>
    where
        I: IntoIterator<Item = &'a PropertyRecord>,
    {
        let mut matched: Vec<&PropertyRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(sort) = self.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(paging.offset())
            .take(paging.limit())
            .cloned()
            .collect();

        Page::new(items, total, paging)
    }
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, paging: PageRequest) -> Self {
        Self {
            items,
            page: paging.page(),
            limit: paging.limit(),
            total,
            total_pages: total.div_ceil(paging.limit()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawListQuery {
        let mut q = RawListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "page" => q.page = v,
                "limit" => q.limit = v,
                "status" => q.status = v,
                "type" => q.property_type = v,
                "city" => q.city = v,
                "minRent" => q.min_rent = v,
                "maxRent" => q.max_rent = v,
                "sortBy" => q.sort_by = v,
                "sortOrder" => q.sort_order = v,
                other => panic!("unknown param {other}"),
            }
        }
        q
    }

    #[test]
    fn defaults_apply_when_params_are_absent_or_blank() {
        let (query, paging) = raw(&[("page", ""), ("city", " ")]).parse().unwrap();
        assert_eq!(query, ListQuery::default());
        assert_eq!(paging, PageRequest::default());
    }

    #[test]
    fn enum_filters_are_case_insensitive() {
        let (query, _) = raw(&[("status", "available"), ("type", "House")]).parse().unwrap();
        assert_eq!(query.status, Some(EnumFilter::Is(PropertyStatus::Available)));
        assert_eq!(query.property_type, Some(EnumFilter::Is(PropertyType::House)));
    }

    #[test]
    fn unknown_enum_values_filter_everything_out() {
        let (query, _) = raw(&[("status", "SOLD"), ("type", "castle")]).parse().unwrap();
        assert_eq!(query.status, Some(EnumFilter::Unknown));
        assert_eq!(query.property_type, Some(EnumFilter::Unknown));

        let sold: EnumFilter<PropertyStatus> = EnumFilter::Unknown;
        assert!(!sold.accepts(PropertyStatus::Available));
        assert!(!sold.accepts(PropertyStatus::Rented));
        assert!(EnumFilter::Is(PropertyStatus::Rented).accepts(PropertyStatus::Rented));
    }

    #[test]
    fn invalid_numbers_are_bad_requests() {
        for pairs in [
            vec![("page", "one")],
            vec![("page", "0")],
            vec![("limit", "0")],
            vec![("limit", "101")],
            vec![("minRent", "cheap")],
            vec![("maxRent", "NaN")],
            vec![("page", "-1")],
        ] {
            let err = raw(&pairs).parse().unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{pairs:?} should fail");
        }
    }

    #[test]
    fn unknown_sort_values_are_bad_requests() {
        assert!(raw(&[("sortBy", "title")]).parse().is_err());
        assert!(raw(&[("sortBy", "area"), ("sortOrder", "sideways")]).parse().is_err());
    }

    #[test]
    fn sort_defaults_to_descending() {
        let (query, _) = raw(&[("sortBy", "monthlyRent")]).parse().unwrap();
        assert_eq!(
            query.sort,
            Some(SortSpec {
                field: SortField::MonthlyRent,
                order: SortOrder::Desc
            })
        );
    }

    #[test]
    fn offset_is_one_indexed() {
        assert_eq!(PageRequest::new(1, 2).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 2).unwrap().offset(), 4);
    }
}
