//! Filter, sort and paginate university records.
//!
//! Everything here is pure: it works on records already loaded by the store.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::university::types::{CountrySummary, Summary, University, UniversityError};

/// Predicate filters. A record matches when every supplied predicate holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Case-insensitive substring of the name.
    pub query: Option<String>,
    /// Exact region.
    pub region: Option<String>,
    pub max_rank: Option<u32>,
    pub min_score: Option<f64>,
    pub max_tuition: Option<f64>,
    pub max_application_fee: Option<f64>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.region.is_none()
            && self.max_rank.is_none()
            && self.min_score.is_none()
            && self.max_tuition.is_none()
            && self.max_application_fee.is_none()
    }

    pub fn matches(&self, university: &University) -> bool {
        if let Some(query) = &self.query {
            if !university.name.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if university.region != *region {
                return false;
            }
        }
        if self.max_rank.is_some_and(|max| university.rank > max) {
            return false;
        }
        if self.min_score.is_some_and(|min| university.score < min) {
            return false;
        }
        if self
            .max_tuition
            .is_some_and(|max| f64::from(university.tuition_fee) > max)
        {
            return false;
        }
        if self
            .max_application_fee
            .is_some_and(|max| f64::from(university.application_fee) > max)
        {
            return false;
        }
        true
    }

    /// Keep only matching records, preserving order.
    pub fn apply(&self, universities: Vec<University>) -> Vec<University> {
        if self.is_empty() {
            return universities;
        }
        universities.into_iter().filter(|u| self.matches(u)).collect()
    }
}

/// Countries whose name contains `country` (case-insensitive), or all of them.
pub fn candidate_countries<'a>(summary: &'a Summary, country: Option<&str>) -> Vec<&'a CountrySummary> {
    match country {
        Some(needle) => {
            let needle = needle.to_lowercase();
            summary
                .countries
                .iter()
                .filter(|c| c.name.to_lowercase().contains(&needle))
                .collect()
        }
        None => summary.countries.iter().collect(),
    }
}

/// A validated page request. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Result<Self, UniversityError> {
        if page == 0 {
            return Err(UniversityError::InvalidRequest(
                "page must be at least 1".to_string(),
            ));
        }
        if limit == 0 {
            return Err(UniversityError::InvalidRequest(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Slice `[(page-1)*limit, page*limit)` out of `items`.
///
/// A page past the end is empty, not an error.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.limit)
        .collect();
    Page {
        items,
        total,
        page: request.page,
        limit: request.limit,
        total_pages: total.div_ceil(request.limit),
    }
}

/// Fields a per-country listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Rank,
    Name,
    Score,
    TuitionFee,
    ApplicationFee,
    Country,
    Region,
    Ranking,
    Code,
    Id,
    StartDate,
    EndDate,
    ApplicationOpen,
}

impl SortField {
    pub const ALL: [SortField; 13] = [
        SortField::Rank,
        SortField::Name,
        SortField::Score,
        SortField::TuitionFee,
        SortField::ApplicationFee,
        SortField::Country,
        SortField::Region,
        SortField::Ranking,
        SortField::Code,
        SortField::Id,
        SortField::StartDate,
        SortField::EndDate,
        SortField::ApplicationOpen,
    ];

    /// The JSON field name.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Rank => "rank",
            SortField::Name => "name",
            SortField::Score => "score",
            SortField::TuitionFee => "tuitionFee",
            SortField::ApplicationFee => "applicationFee",
            SortField::Country => "country",
            SortField::Region => "region",
            SortField::Ranking => "ranking",
            SortField::Code => "code",
            SortField::Id => "id",
            SortField::StartDate => "startDate",
            SortField::EndDate => "endDate",
            SortField::ApplicationOpen => "applicationOpen",
        }
    }

    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.as_str()).collect()
    }

    fn key(self, u: &University) -> SortKey<'_> {
        match self {
            SortField::Rank => SortKey::Number(f64::from(u.rank)),
            SortField::Score => SortKey::Number(u.score),
            SortField::TuitionFee => SortKey::Number(f64::from(u.tuition_fee)),
            SortField::ApplicationFee => SortKey::Number(f64::from(u.application_fee)),
            SortField::ApplicationOpen => SortKey::Flag(u.application_open),
            SortField::Name => SortKey::text(&u.name),
            SortField::Country => SortKey::text(&u.country),
            SortField::Region => SortKey::text(&u.region),
            SortField::Ranking => SortKey::text(&u.ranking),
            SortField::Code => SortKey::text(&u.code),
            SortField::Id => SortKey::text(&u.id),
            SortField::StartDate => SortKey::text(&u.start_date),
            SortField::EndDate => SortKey::text(&u.end_date),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = UniversityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UniversityError::InvalidRequest(format!("Invalid sortBy field '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = UniversityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UniversityError::InvalidRequest(format!(
                "Invalid sortOrder '{}'. Must be one of: asc, desc",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Rank,
            order: SortOrder::Asc,
        }
    }
}

/// Comparable projection of one field.
///
/// Text that parses as a finite number compares numerically. Across kinds
/// the order is flags, numbers, then text.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SortKey<'a> {
    Flag(bool),
    Number(f64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn text(s: &'a str) -> Self {
        let trimmed = s.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if !trimmed.is_empty() && n.is_finite() => SortKey::Number(n),
            _ => SortKey::Text(s),
        }
    }

    fn kind(&self) -> u8 {
        match self {
            SortKey::Flag(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Flag(a), SortKey::Flag(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

/// Stable sort by an arbitrary field and direction.
pub fn sort_universities(universities: &mut [University], spec: SortSpec) {
    universities.sort_by(|a, b| {
        let ordering = spec.field.key(a).compare(&spec.field.key(b));
        match spec.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Stable ascending sort by rank.
pub fn sort_by_rank(universities: &mut [University]) {
    universities.sort_by_key(|u| u.rank);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uni(id: &str, rank: u32, score: f64) -> University {
        University {
            id: id.to_string(),
            rank,
            ranking: rank.to_string(),
            name: format!("{} University", id),
            code: String::new(),
            country: "Testland".to_string(),
            score,
            region: "Europe".to_string(),
            start_date: String::new(),
            end_date: String::new(),
            tuition_fee: 20_000,
            application_fee: 100,
            application_open: false,
            application_url: String::new(),
            image_url: String::new(),
            is_watchlisted: false,
        }
    }

    fn ids(universities: &[University]) -> Vec<&str> {
        universities.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_filters_conjunction() {
        let mut cheap = uni("cheap", 5, 70.0);
        cheap.tuition_fee = 9_000;
        let mut asia = uni("asia", 3, 90.0);
        asia.region = "Asia".to_string();
        let all = vec![uni("a", 1, 95.0), uni("b", 50, 40.0), cheap, asia];

        let filters = Filters {
            region: Some("Europe".to_string()),
            max_rank: Some(10),
            min_score: Some(60.0),
            ..Filters::default()
        };
        let matched = filters.apply(all.clone());
        assert_eq!(ids(&matched), vec!["a", "cheap"]);
        assert!(matched
            .iter()
            .all(|u| u.rank <= 10 && u.score >= 60.0 && u.region == "Europe"));

        let filters = Filters {
            max_tuition: Some(10_000.0),
            ..Filters::default()
        };
        assert_eq!(ids(&filters.apply(all)), vec!["cheap"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filters = Filters {
            max_rank: Some(5),
            min_score: Some(70.0),
            max_application_fee: Some(100.0),
            ..Filters::default()
        };
        assert!(filters.matches(&uni("edge", 5, 70.0)));
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let mut u = uni("x", 1, 1.0);
        u.name = "Massachusetts Institute of Technology".to_string();
        let filters = Filters {
            query: Some("INSTITUTE".to_string()),
            ..Filters::default()
        };
        assert!(filters.matches(&u));
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=17).collect();

        let page = paginate(items.clone(), PageRequest::new(2, 8).unwrap());
        assert_eq!(page.items, (9..=16).collect::<Vec<_>>());
        assert_eq!(page.total, 17);
        assert_eq!(page.total_pages, 3);

        let last = paginate(items.clone(), PageRequest::new(3, 8).unwrap());
        assert_eq!(last.items, vec![17]);

        let past = paginate(items, PageRequest::new(4, 8).unwrap());
        assert!(past.items.is_empty());
        assert_eq!(past.total_pages, 3);
    }

    #[test]
    fn test_paginate_empty_and_huge_page() {
        let page = paginate(Vec::<u32>::new(), PageRequest::new(1, 20).unwrap());
        assert_eq!(page.total_pages, 0);

        let page = paginate(vec![1, 2, 3], PageRequest::new(usize::MAX, usize::MAX).unwrap());
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_request_rejects_zero() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
    }

    #[test]
    fn test_rank_sort_is_stable() {
        let mut list = vec![uni("a", 2, 0.0), uni("b", 1, 0.0), uni("c", 2, 0.0), uni("d", 1, 0.0)];
        sort_by_rank(&mut list);
        assert_eq!(ids(&list), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_descending_sort_is_stable() {
        let mut list = vec![uni("a", 1, 80.0), uni("b", 2, 90.0), uni("c", 3, 80.0)];
        sort_universities(
            &mut list,
            SortSpec {
                field: SortField::Score,
                order: SortOrder::Desc,
            },
        );
        assert_eq!(ids(&list), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_numeric_strings_sort_numerically() {
        let mut list = vec![uni("a", 1, 0.0), uni("b", 2, 0.0), uni("c", 3, 0.0)];
        list[0].ranking = "100".to_string();
        list[1].ranking = "9".to_string();
        list[2].ranking = "1201-1400".to_string();
        sort_universities(
            &mut list,
            SortSpec {
                field: SortField::Ranking,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&list), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!("tuitionFee".parse::<SortField>().unwrap(), SortField::TuitionFee);
        assert!("tuition_fee".parse::<SortField>().is_err());
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("down".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_candidate_countries() {
        let summary = Summary {
            total_countries: 3,
            total_universities: 3,
            countries: ["United States", "United Kingdom", "France"]
                .iter()
                .map(|name| CountrySummary {
                    name: name.to_string(),
                    count: 1,
                    file_name: format!("{}.json", name),
                })
                .collect(),
        };
        let names = |c: Vec<&CountrySummary>| c.iter().map(|c| c.name.clone()).collect::<Vec<_>>();

        assert_eq!(
            names(candidate_countries(&summary, Some("united"))),
            vec!["United States", "United Kingdom"]
        );
        assert_eq!(candidate_countries(&summary, None).len(), 3);
        assert!(candidate_countries(&summary, Some("peru")).is_empty());
    }
}
