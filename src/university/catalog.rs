//! University catalog operations: the query pipeline over the store.
//!
//! # Pipeline
//! ```text
//! summary.json → candidate countries (country substring)
//!     → store.collect (concatenate records, missing files skipped)
//!     → Filters::apply (conjunction of supplied predicates)
//!     → stable sort
//!     → paginate / take N
//! ```

use std::collections::BTreeSet;

use crate::university::query::{
    candidate_countries, paginate, sort_by_rank, sort_universities, Filters, Page, PageRequest,
    SortSpec,
};
use crate::university::store::UniversityStore;
use crate::university::types::{
    country_file_name, Summary, University, UniversityError, UniversityResult,
};

/// Parameters of a global search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Narrows which country files are loaded; not a post-filter.
    pub country: Option<String>,
    pub filters: Filters,
    pub page: PageRequest,
}

impl SearchRequest {
    /// An unconstrained full scan is refused.
    pub fn validate(&self) -> UniversityResult<()> {
        if self.country.is_none() && self.filters.is_empty() {
            return Err(UniversityError::InvalidRequest(
                "At least one search parameter is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub page: Page<University>,
    pub skipped: Vec<String>,
}

/// Parameters of the top-N listing. No constraint is required.
#[derive(Debug, Clone)]
pub struct TopRequest {
    pub limit: usize,
    pub country: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TopResults {
    /// Matches before the limit was applied.
    pub total_found: usize,
    pub universities: Vec<University>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CountryListing {
    pub country: String,
    pub page: Page<University>,
}

/// Read-only query surface over a [`UniversityStore`].
#[derive(Debug, Clone)]
pub struct Catalog {
    store: UniversityStore,
}

impl Catalog {
    pub fn new(store: UniversityStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &UniversityStore {
        &self.store
    }

    /// The summary index.
    pub fn countries(&self) -> UniversityResult<Summary> {
        self.store.summary()
    }

    /// One country's universities, sorted and paginated.
    pub fn country_listing(
        &self,
        country_name: &str,
        sort: SortSpec,
        page: PageRequest,
    ) -> UniversityResult<CountryListing> {
        let document = self
            .store
            .country(&country_file_name(country_name))?
            .ok_or_else(|| UniversityError::CountryNotFound(country_name.to_string()))?;

        let mut universities = document.universities;
        sort_universities(&mut universities, sort);

        Ok(CountryListing {
            country: document.country,
            page: paginate(universities, page),
        })
    }

    /// Filtered search across countries, ordered by rank.
    pub fn search(&self, request: &SearchRequest) -> UniversityResult<SearchResults> {
        request.validate()?;

        let summary = self.store.summary()?;
        let candidates = candidate_countries(&summary, request.country.as_deref());
        let aggregate = self.store.collect(candidates)?;

        let mut universities = request.filters.apply(aggregate.universities);
        sort_by_rank(&mut universities);

        tracing::debug!(
            countries = summary.countries.len(),
            matched = universities.len(),
            "Search complete"
        );

        Ok(SearchResults {
            page: paginate(universities, request.page),
            skipped: aggregate.skipped,
        })
    }

    /// The `limit` best-ranked universities, optionally narrowed.
    pub fn top(&self, request: &TopRequest) -> UniversityResult<TopResults> {
        if request.limit == 0 {
            return Err(UniversityError::InvalidRequest(
                "limit must be at least 1".to_string(),
            ));
        }

        let summary = self.store.summary()?;
        let candidates = candidate_countries(&summary, request.country.as_deref());
        let aggregate = self.store.collect(candidates)?;

        let filters = Filters {
            region: request.region.clone(),
            ..Filters::default()
        };
        let mut universities = filters.apply(aggregate.universities);
        sort_by_rank(&mut universities);

        let total_found = universities.len();
        universities.truncate(request.limit);

        Ok(TopResults {
            total_found,
            universities,
            skipped: aggregate.skipped,
        })
    }

    /// Distinct non-empty regions across all countries, sorted.
    pub fn regions(&self) -> UniversityResult<Vec<String>> {
        let summary = self.store.summary()?;
        let aggregate = self.store.collect(&summary.countries)?;

        let regions: BTreeSet<String> = aggregate
            .universities
            .into_iter()
            .map(|u| u.region)
            .filter(|r| !r.is_empty())
            .collect();
        Ok(regions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregationPolicy;
    use serde_json::json;
    use std::path::Path;

    /// Writes a dataset where each country's ranks are given explicitly.
    fn write_dataset(dir: &Path, countries: &[(&str, &str, Vec<(u32, f64)>)]) {
        let mut entries = Vec::new();
        let mut total = 0;
        for (name, region, records) in countries {
            let universities: Vec<_> = records
                .iter()
                .enumerate()
                .map(|(i, (rank, score))| {
                    json!({
                        "id": format!("{}_{}", name, i + 1),
                        "rank": rank,
                        "name": format!("{} University {}", name, i + 1),
                        "country": name,
                        "score": score,
                        "region": region,
                        "tuitionFee": 10_000 + i * 1_000,
                        "applicationFee": 50 + i,
                    })
                })
                .collect();
            let file_name = country_file_name(name);
            std::fs::write(
                dir.join(&file_name),
                json!({
                    "country": name,
                    "totalUniversities": records.len(),
                    "universities": universities,
                })
                .to_string(),
            )
            .unwrap();
            entries.push(json!({"name": name, "count": records.len(), "fileName": file_name}));
            total += records.len();
        }
        std::fs::write(
            dir.join("summary.json"),
            json!({
                "totalCountries": countries.len(),
                "totalUniversities": total,
                "countries": entries,
            })
            .to_string(),
        )
        .unwrap();
    }

    /// Three countries with 10/5/2 universities and interleaved ranks 1..=17.
    fn three_countries() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let a: Vec<(u32, f64)> = [1, 3, 5, 7, 9, 11, 13, 15, 16, 17]
            .iter()
            .map(|r| (*r, 100.0 - *r as f64))
            .collect();
        let b: Vec<(u32, f64)> = [2, 4, 6, 8, 10].iter().map(|r| (*r, 100.0 - *r as f64)).collect();
        let c: Vec<(u32, f64)> = [12, 14].iter().map(|r| (*r, 100.0 - *r as f64)).collect();
        write_dataset(
            dir.path(),
            &[
                ("United States", "North America", a),
                ("United Kingdom", "Europe", b),
                ("Japan", "Asia", c),
            ],
        );
        let catalog = Catalog::new(UniversityStore::new(dir.path(), AggregationPolicy::BestEffort));
        (dir, catalog)
    }

    fn ranks(universities: &[University]) -> Vec<u32> {
        universities.iter().map(|u| u.rank).collect()
    }

    fn search(country: Option<&str>, filters: Filters, page: usize, limit: usize) -> SearchRequest {
        SearchRequest {
            country: country.map(str::to_string),
            filters,
            page: PageRequest::new(page, limit).unwrap(),
        }
    }

    #[test]
    fn test_top_across_countries() {
        let (_dir, catalog) = three_countries();
        let top = catalog
            .top(&TopRequest {
                limit: 8,
                country: None,
                region: None,
            })
            .unwrap();
        assert_eq!(top.total_found, 17);
        assert_eq!(ranks(&top.universities), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_top_narrowed_by_region_and_country() {
        let (_dir, catalog) = three_countries();
        let top = catalog
            .top(&TopRequest {
                limit: 3,
                country: Some("united".into()),
                region: Some("Europe".into()),
            })
            .unwrap();
        assert_eq!(top.total_found, 5);
        assert_eq!(ranks(&top.universities), vec![2, 4, 6]);
    }

    #[test]
    fn test_search_requires_a_parameter() {
        let (_dir, catalog) = three_countries();
        let err = catalog.search(&search(None, Filters::default(), 1, 20)).unwrap_err();
        assert!(matches!(err, UniversityError::InvalidRequest(_)));
    }

    #[test]
    fn test_search_single_region_filter() {
        let (_dir, catalog) = three_countries();
        let filters = Filters {
            region: Some("Europe".into()),
            ..Filters::default()
        };
        let results = catalog.search(&search(None, filters, 1, 20)).unwrap();
        assert_eq!(ranks(&results.page.items), vec![2, 4, 6, 8, 10]);
        assert!(results.skipped.is_empty());
    }

    #[test]
    fn test_search_country_narrows_and_paginates() {
        let (_dir, catalog) = three_countries();
        let results = catalog
            .search(&search(Some("STATES"), Filters::default(), 2, 4))
            .unwrap();
        assert_eq!(results.page.total, 10);
        assert_eq!(results.page.total_pages, 3);
        assert_eq!(ranks(&results.page.items), vec![9, 11, 13, 15]);

        let past = catalog
            .search(&search(Some("States"), Filters::default(), 9, 4))
            .unwrap();
        assert!(past.page.items.is_empty());
        assert_eq!(past.page.total_pages, 3);
    }

    #[test]
    fn test_search_results_satisfy_every_predicate() {
        let (_dir, catalog) = three_countries();
        let filters = Filters {
            max_rank: Some(12),
            min_score: Some(90.0),
            max_tuition: Some(13_000.0),
            ..Filters::default()
        };
        let results = catalog.search(&search(None, filters, 1, 50)).unwrap();
        assert!(!results.page.items.is_empty());
        for u in &results.page.items {
            assert!(u.rank <= 12 && u.score >= 90.0 && u.tuition_fee <= 13_000);
        }
    }

    #[test]
    fn test_country_listing_sorted_by_score_desc() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<(u32, f64)> = (1..=12).map(|r| (r, (r * 7 % 12) as f64)).collect();
        write_dataset(dir.path(), &[("France", "Europe", records.clone())]);
        let catalog = Catalog::new(UniversityStore::new(dir.path(), AggregationPolicy::BestEffort));

        let spec = SortSpec {
            field: "score".parse().unwrap(),
            order: "desc".parse().unwrap(),
        };
        let listing = catalog
            .country_listing("France", spec, PageRequest::new(2, 5).unwrap())
            .unwrap();

        let mut expected = records;
        expected.sort_by(|a, b| b.1.total_cmp(&a.1));
        let expected: Vec<f64> = expected[5..10].iter().map(|r| r.1).collect();
        let scores: Vec<f64> = listing.page.items.iter().map(|u| u.score).collect();

        assert_eq!(listing.country, "France");
        assert_eq!(scores, expected);
        assert_eq!(listing.page.total_pages, 3);
    }

    #[test]
    fn test_country_listing_unknown_country() {
        let (_dir, catalog) = three_countries();
        let err = catalog
            .country_listing("Atlantis", SortSpec::default(), PageRequest::new(1, 20).unwrap())
            .unwrap_err();
        assert!(matches!(err, UniversityError::CountryNotFound(_)));
    }

    #[test]
    fn test_regions_sorted_distinct() {
        let (_dir, catalog) = three_countries();
        assert_eq!(
            catalog.regions().unwrap(),
            vec!["Asia", "Europe", "North America"]
        );
    }

    #[test]
    fn test_missing_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(UniversityStore::new(dir.path(), AggregationPolicy::BestEffort));
        assert!(matches!(catalog.regions(), Err(UniversityError::DataNotFound)));
        assert!(matches!(catalog.countries(), Err(UniversityError::DataNotFound)));
    }

    #[test]
    fn test_missing_country_file_is_partial_data() {
        let (dir, catalog) = three_countries();
        std::fs::remove_file(dir.path().join("Japan.json")).unwrap();
        let top = catalog
            .top(&TopRequest {
                limit: 50,
                country: None,
                region: None,
            })
            .unwrap();
        assert_eq!(top.total_found, 15);
        assert!(top.skipped.is_empty());
    }
}
