//! In-memory inverted index over parsed catalogues.

use crate::catalogue::Catalogue;
use crate::error::{InvalidQuery, NotFound};
use crate::model::{Endpoint, endpoint_key};
use ahash::AHashMap;
use indexmap::IndexMap;

use super::scoring::{FieldWeights, idf, suggest};
use super::tokenize::{query_terms, tokenize};

/// Result count used when the caller does not pass a limit.
pub const DEFAULT_LIMIT: i64 = 20;

/// Documents containing one term, with the term's field-weighted frequency.
#[derive(Debug, Clone)]
struct Postings {
    idf: f32,
    /// `(document index, weighted tf)`, ascending by document index.
    docs: Vec<(usize, f32)>,
}

#[derive(Debug, Clone)]
struct Document {
    key: String,
    endpoint: Endpoint,
}

/// Per-API metadata kept next to the index for listing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub api_name: String,
    pub base_url: Option<String>,
    pub description: Option<String>,
    pub auth_header: Option<String>,
    /// Section name → endpoint keys, in first-seen order.
    pub sections: IndexMap<String, Vec<String>>,
}

impl ApiInfo {
    pub fn endpoint_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// Section name with the number of endpoints declared under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSummary<'a> {
    pub name: &'a str,
    pub endpoint_count: usize,
}

/// Answer to [`SearchIndex::get_section`].
#[derive(Debug, Clone, PartialEq)]
pub enum SectionView<'a> {
    /// No section was named: every section with its endpoint count.
    All(Vec<SectionSummary<'a>>),
    /// The endpoints of one section, in declaration order.
    Section {
        name: &'a str,
        endpoints: Vec<&'a Endpoint>,
    },
}

/// A keyword search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub text: &'a str,
    /// Exact, case-sensitive `api_name`.
    pub api_filter: Option<&'a str>,
    /// HTTP verb; compared upper-cased.
    pub method_filter: Option<&'a str>,
    pub limit: i64,
}

impl<'a> Query<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            api_filter: None,
            method_filter: None,
            limit: DEFAULT_LIMIT,
        }
    }

    pub const fn api(mut self, api_name: &'a str) -> Self {
        self.api_filter = Some(api_name);
        self
    }

    pub const fn method(mut self, method: &'a str) -> Self {
        self.method_filter = Some(method);
        self
    }

    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// One ranked search result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub key: &'a str,
    pub score: f32,
    pub endpoint: &'a Endpoint,
}

/// Accumulates field-weighted term frequencies before IDF finalization.
pub(crate) struct IndexBuilder {
    weights: FieldWeights,
    terms: AHashMap<String, Vec<(usize, f32)>>,
    documents: Vec<Document>,
    by_key: AHashMap<String, usize>,
    apis: IndexMap<String, ApiInfo>,
    occurrences: usize,
}

impl IndexBuilder {
    pub(crate) fn new(weights: FieldWeights) -> Self {
        Self {
            weights,
            terms: AHashMap::default(),
            documents: Vec::new(),
            by_key: AHashMap::default(),
            apis: IndexMap::new(),
            occurrences: 0,
        }
    }

    pub(crate) fn add_catalogue(&mut self, catalogue: Catalogue) {
        let info = ApiInfo {
            api_name: catalogue.api_name().to_string(),
            base_url: catalogue.base_url().map(str::to_string),
            description: catalogue.description().map(str::to_string),
            auth_header: catalogue.auth_header().map(str::to_string),
            sections: catalogue.sections().clone(),
        };

        for endpoint in catalogue.into_endpoints() {
            self.add_endpoint(endpoint);
        }
        self.apis.insert(info.api_name.clone(), info);
    }

    /// Adds every field of the endpoint, summing `weight × occurrences` per term.
    fn add_endpoint(&mut self, endpoint: Endpoint) {
        let doc = self.documents.len();

        let mut counts: AHashMap<String, f32> = AHashMap::new();
        for (field, text) in endpoint.fields() {
            let weight = self.weights.weight(field);
            for token in tokenize(text) {
                *counts.entry(token).or_insert(0.0) += weight;
                self.occurrences += 1;
            }
        }

        for (term, tf) in counts {
            self.terms.entry(term).or_default().push((doc, tf));
        }

        let key = endpoint.key();
        self.by_key.insert(key.clone(), doc);
        self.documents.push(Document { key, endpoint });
    }

    /// Computes IDF for every term and produces the read-only index.
    pub(crate) fn finish(self) -> SearchIndex {
        let start = std::time::Instant::now();
        let total_docs = self.documents.len();
        let mut pairs = 0;

        let terms: AHashMap<String, Postings> = self
            .terms
            .into_iter()
            .map(|(term, docs)| {
                pairs += docs.len();
                let postings = Postings {
                    idf: idf(total_docs, docs.len()),
                    docs,
                };
                (term, postings)
            })
            .collect();

        let index = SearchIndex {
            terms,
            documents: self.documents,
            by_key: self.by_key,
            apis: self.apis,
        };

        tracing::info!(
            "Built search index: {} unique terms, {} documents, {} term-document pairs ({} occurrences) in {:?}",
            index.term_count(),
            index.document_count(),
            pairs,
            self.occurrences,
            start.elapsed()
        );

        index
    }
}

/// Read-only keyword index over a set of catalogues.
///
/// Never mutated after [`SearchIndex::build`]; a rebuild produces a new
/// instance, so shared references can be queried from any number of threads.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    terms: AHashMap<String, Postings>,
    documents: Vec<Document>,
    by_key: AHashMap<String, usize>,
    apis: IndexMap<String, ApiInfo>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        IndexBuilder::new(FieldWeights::default()).finish()
    }
}

impl SearchIndex {
    /// Builds an index with the default field weights.
    pub fn build(catalogues: impl IntoIterator<Item = Catalogue>) -> Self {
        Self::build_with(catalogues, FieldWeights::default())
    }

    /// Builds an index. Catalogues sharing an `api_name` are merged in order
    /// (see [`Catalogue::merge`]), so an API keeps its position and an empty
    /// catalogue from a failed source removes nothing.
    pub fn build_with(catalogues: impl IntoIterator<Item = Catalogue>, weights: FieldWeights) -> Self {
        let mut by_api: IndexMap<String, Vec<Catalogue>> = IndexMap::new();
        for catalogue in catalogues {
            by_api
                .entry(catalogue.api_name().to_string())
                .or_default()
                .push(catalogue);
        }

        let mut builder = IndexBuilder::new(weights);
        for (api_name, sources) in by_api {
            if sources.len() > 1 {
                tracing::debug!("API '{}': merging {} sources", api_name, sources.len());
            }
            if let Some(catalogue) = sources.into_iter().reduce(Catalogue::merge) {
                builder.add_catalogue(catalogue);
            }
        }
        builder.finish()
    }

    /// Ranks endpoints by summed `tf × idf` over the distinct query terms.
    ///
    /// Filters are applied after scoring. Ties are broken by ascending key.
    pub fn search(&self, query: &Query<'_>) -> Result<Vec<SearchHit<'_>>, InvalidQuery> {
        let terms = query_terms(query.text);
        if terms.is_empty() {
            return Err(InvalidQuery::EmptyQuery);
        }
        if query.limit <= 0 {
            return Err(InvalidQuery::NonPositiveLimit { limit: query.limit });
        }

        let mut scores: AHashMap<usize, f32> = AHashMap::new();
        for term in &terms {
            let Some(postings) = self.terms.get(term) else {
                continue;
            };
            for &(doc, tf) in &postings.docs {
                *scores.entry(doc).or_insert(0.0) += tf * postings.idf;
            }
        }

        let method = query.method_filter.map(str::to_ascii_uppercase);
        let mut hits: Vec<SearchHit<'_>> = scores
            .into_iter()
            .map(|(doc, score)| {
                let document = &self.documents[doc];
                SearchHit {
                    key: &document.key,
                    score,
                    endpoint: &document.endpoint,
                }
            })
            .filter(|hit| query.api_filter.is_none_or(|api| hit.endpoint.api_name == api))
            .filter(|hit| method.as_deref().is_none_or(|m| hit.endpoint.method == m))
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key.cmp(b.key)));
        hits.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));

        tracing::debug!(
            "Query '{}' ({} terms): {} hits",
            query.text,
            terms.len(),
            hits.len()
        );
        Ok(hits)
    }

    /// Exact lookup by `api_name:METHOD:path`.
    pub fn get_by_key(&self, key: &str) -> Result<&Endpoint, NotFound> {
        self.by_key
            .get(key)
            .map(|&doc| &self.documents[doc].endpoint)
            .ok_or_else(|| NotFound::Endpoint {
                key: key.to_string(),
            })
    }

    /// Exact lookup by its parts; the method is upper-cased.
    pub fn get_endpoint(&self, api_name: &str, method: &str, path: &str) -> Result<&Endpoint, NotFound> {
        self.get_by_key(&endpoint_key(api_name, method, path))
    }

    /// Every indexed API, in source order.
    pub fn list_apis(&self) -> impl ExactSizeIterator<Item = &ApiInfo> {
        self.apis.values()
    }

    pub fn api(&self, api_name: &str) -> Result<&ApiInfo, NotFound> {
        self.apis.get(api_name).ok_or_else(|| NotFound::Api {
            api_name: api_name.to_string(),
            suggestions: suggest(api_name, self.apis.keys().map(String::as_str)),
        })
    }

    /// Sections of one API with their endpoint counts.
    pub fn list_sections(&self, api_name: &str) -> Result<Vec<SectionSummary<'_>>, NotFound> {
        let api = self.api(api_name)?;
        Ok(api
            .sections
            .iter()
            .map(|(name, keys)| SectionSummary {
                name,
                endpoint_count: keys.len(),
            })
            .collect())
    }

    /// One section's endpoints, or every section summary when `section` is `None`.
    ///
    /// Section names match exactly first, then case-insensitively.
    pub fn get_section(&self, api_name: &str, section: Option<&str>) -> Result<SectionView<'_>, NotFound> {
        let Some(wanted) = section else {
            return self.list_sections(api_name).map(SectionView::All);
        };

        let api = self.api(api_name)?;
        let found = api.sections.get_key_value(wanted).or_else(|| {
            api.sections
                .iter()
                .find(|(name, _)| name.to_lowercase() == wanted.to_lowercase())
        });

        let Some((name, keys)) = found else {
            return Err(NotFound::Section {
                api_name: api_name.to_string(),
                section: wanted.to_string(),
                suggestions: suggest(wanted, api.sections.keys().map(String::as_str)),
            });
        };

        let endpoints = keys
            .iter()
            .filter_map(|key| self.by_key.get(key))
            .map(|&doc| &self.documents[doc].endpoint)
            .collect();
        Ok(SectionView::Section { name, endpoints })
    }

    /// Number of unique terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of indexed endpoints.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn api_count(&self) -> usize {
        self.apis.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParamLocation, Parameter};
    use assert2::{check, let_assert};
    use rstest::{fixture, rstest};

    fn endpoint(api: &str, method: &str, path: &str, section: &str, summary: &str) -> Endpoint {
        let mut endpoint = Endpoint::new(api, method, path, section);
        endpoint.summary = summary.to_string();
        endpoint
    }

    #[fixture]
    fn index() -> SearchIndex {
        let mut create = endpoint("A", "POST", "/v2/storage/buckets/{id}/tables", "Tables", "Create table");
        let mut name = Parameter::new("name", ParamLocation::Query);
        name.description = "Table name".to_string();
        create.parameters.push(name);

        let storage = Catalogue::new(
            "A",
            None,
            vec![
                create,
                endpoint("A", "GET", "/v2/storage/buckets", "Buckets", "List buckets"),
                endpoint("A", "GET", "/v2/storage/tables/{id}", "Tables", "Table detail"),
            ],
        );
        let queue = Catalogue::new(
            "B",
            Some("https://queue.example.com".to_string()),
            vec![
                endpoint("B", "GET", "/jobs", "Jobs", "List jobs"),
                endpoint("B", "POST", "/jobs", "Jobs", "Create jobs"),
            ],
        );
        SearchIndex::build(vec![storage, queue])
    }

    fn keys(hits: &[SearchHit<'_>]) -> Vec<String> {
        hits.iter().map(|hit| hit.key.to_string()).collect()
    }

    #[rstest]
    fn search_ranks_path_matches(index: SearchIndex) {
        let hits = index.search(&Query::new("bucket buckets")).unwrap();
        check!(hits[0].key == "A:GET:/v2/storage/buckets");
        check!(hits.iter().all(|hit| hit.endpoint.api_name == "A"));
    }

    #[rstest]
    fn search_is_case_insensitive(index: SearchIndex) {
        let upper = index.search(&Query::new("GET")).unwrap();
        let lower = index.search(&Query::new("get")).unwrap();
        check!(keys(&upper) == keys(&lower));
        check!(!upper.is_empty());
    }

    #[rstest]
    fn more_matching_terms_never_lower_score(index: SearchIndex) {
        let base = index.search(&Query::new("tables")).unwrap();
        let more = index.search(&Query::new("tables create")).unwrap();

        for hit in &base {
            let_assert!(Some(extended) = more.iter().find(|h| h.key == hit.key));
            check!(extended.score >= hit.score);
        }
    }

    #[rstest]
    fn duplicate_query_terms_count_once(index: SearchIndex) {
        let once = index.search(&Query::new("jobs")).unwrap();
        let twice = index.search(&Query::new("jobs JOBS jobs")).unwrap();
        check!(once == twice);
    }

    #[rstest]
    fn filters_only_restrict(index: SearchIndex) {
        let all = keys(&index.search(&Query::new("create")).unwrap());
        let only_b = keys(&index.search(&Query::new("create").api("B")).unwrap());
        let only_post = keys(&index.search(&Query::new("create").method("post")).unwrap());

        check!(only_b == ["B:POST:/jobs"]);
        check!(only_b.iter().all(|key| all.contains(key)));
        check!(only_post.iter().all(|key| all.contains(key)));
        check!(only_post.len() == 2);
    }

    #[rstest]
    fn filter_with_no_matches_is_empty_not_error(index: SearchIndex) {
        let hits = index.search(&Query::new("bucket").api("B")).unwrap();
        check!(hits.is_empty());

        let hits = index.search(&Query::new("bucket").api("a")).unwrap();
        check!(hits.is_empty());
    }

    #[rstest]
    fn limit_returns_prefix(index: SearchIndex) {
        let full = keys(&index.search(&Query::new("list create table jobs")).unwrap());
        let limited = keys(&index.search(&Query::new("list create table jobs").limit(2)).unwrap());
        check!(limited.len() == 2);
        check!(limited[..] == full[..2]);
    }

    #[rstest]
    fn unmatched_terms_do_not_reject_query(index: SearchIndex) {
        let hits = index.search(&Query::new("jobs nonexistentterm")).unwrap();
        check!(hits.len() == 2);
        check!(index.search(&Query::new("nonexistentterm")).unwrap().is_empty());
    }

    #[rstest]
    #[case("", 10, InvalidQuery::EmptyQuery)]
    #[case("  --- ", 10, InvalidQuery::EmptyQuery)]
    #[case("table", 0, InvalidQuery::NonPositiveLimit { limit: 0 })]
    #[case("table", -3, InvalidQuery::NonPositiveLimit { limit: -3 })]
    fn invalid_queries(index: SearchIndex, #[case] text: &str, #[case] limit: i64, #[case] expected: InvalidQuery) {
        check!(index.search(&Query::new(text).limit(limit)) == Err(expected));
    }

    #[rstest]
    fn ties_break_by_key(index: SearchIndex) {
        let hits = index.search(&Query::new("jobs").api("B")).unwrap();
        check!(hits[0].score == hits[1].score);
        check!(keys(&hits) == ["B:GET:/jobs", "B:POST:/jobs"]);
    }

    #[rstest]
    fn lookup_by_key_is_exact(index: SearchIndex) {
        let_assert!(Ok(found) = index.get_by_key("B:GET:/jobs"));
        check!(found.summary == "List jobs");
        check!(index.get_endpoint("B", "get", "/jobs") == Ok(found));

        check!(index.get_by_key("B:GET:/job") == Err(NotFound::Endpoint { key: "B:GET:/job".to_string() }));
    }

    #[rstest]
    fn sections_come_from_catalogues(index: SearchIndex) {
        let sections = index.list_sections("A").unwrap();
        check!(sections == [
            SectionSummary { name: "Tables", endpoint_count: 2 },
            SectionSummary { name: "Buckets", endpoint_count: 1 },
        ]);

        let_assert!(Ok(SectionView::Section { name, endpoints }) = index.get_section("A", Some("tables")));
        check!(name == "Tables");
        check!(endpoints.len() == 2);

        let_assert!(Ok(SectionView::All(all)) = index.get_section("B", None));
        check!(all.len() == 1);
    }

    #[rstest]
    fn unknown_api_and_section_are_not_found(index: SearchIndex) {
        let_assert!(Err(NotFound::Api { suggestions, .. }) = index.list_sections("a"));
        check!(suggestions == ["A"]);

        let_assert!(Err(err) = index.get_section("A", Some("Tabels")));
        check!(matches!(err, NotFound::Section { .. }));
        check!(err.suggestions() == ["Tables"]);
    }

    #[test]
    fn catalogues_of_one_api_are_merged() {
        let first = Catalogue::new(
            "A",
            None,
            vec![
                endpoint("A", "GET", "/old", "", "Old"),
                endpoint("A", "GET", "/shared", "", "First"),
            ],
        );
        let other = Catalogue::new("B", None, vec![endpoint("B", "GET", "/b", "", "B")]);
        let second = Catalogue::new(
            "A",
            Some("https://a.example.com".to_string()),
            vec![
                endpoint("A", "GET", "/new", "", "New"),
                endpoint("A", "GET", "/shared", "", "Second"),
            ],
        );
        let index = SearchIndex::build(vec![first, other, second, Catalogue::empty("A")]);

        check!(index.api_count() == 2);
        check!(index.document_count() == 4);
        check!(index.get_by_key("A:GET:/old").is_ok());
        check!(index.get_by_key("A:GET:/new").is_ok());
        check!(index.get_by_key("A:GET:/shared").unwrap().summary == "Second");

        let apis: Vec<_> = index.list_apis().map(|api| api.api_name.as_str()).collect();
        check!(apis == ["A", "B"]);
        let a = index.api("A").unwrap();
        check!(a.endpoint_count() == 3);
        check!(a.base_url.as_deref() == Some("https://a.example.com"));
    }

    #[rstest]
    fn rebuild_answers_identically(index: SearchIndex) {
        let catalogues: Vec<Catalogue> = index
            .list_apis()
            .map(|api| {
                let endpoints = api
                    .sections
                    .values()
                    .flatten()
                    .filter_map(|key| index.get_by_key(key).ok().cloned())
                    .collect::<Vec<_>>();
                Catalogue::new(api.api_name.clone(), api.base_url.clone(), endpoints)
            })
            .collect();
        let rebuilt = SearchIndex::build(catalogues);

        for text in ["table", "jobs create", "v2 storage"] {
            let original = index.search(&Query::new(text)).unwrap();
            let again = rebuilt.search(&Query::new(text)).unwrap();
            check!(keys(&original) == keys(&again));
        }
    }

    #[test]
    fn empty_index_answers_nothing() {
        let index = SearchIndex::default();
        check!(index.document_count() == 0);
        check!(index.search(&Query::new("anything")).unwrap().is_empty());
        check!(index.list_apis().len() == 0);
    }
}
