//! Full result set from the last analysis plus the filtered view shown to the user.

use crate::backend::types::AnalysisResult;

/// Current filter criteria. An empty criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub tributo: Option<String>,
    pub empresa: String,
}

impl Filters {
    fn matches(&self, result: &AnalysisResult, empresa_lower: &str) -> bool {
        let tributo_ok = match self.tributo.as_deref() {
            None | Some("") => true,
            Some(tributo) => result.tributo == tributo,
        };
        tributo_ok && (empresa_lower.is_empty() || mentions(result, empresa_lower))
    }
}

/// Case-insensitive substring search over companies, the matched line, and the context.
fn mentions(result: &AnalysisResult, needle_lower: &str) -> bool {
    result
        .empresas_identificadas
        .iter()
        .any(|empresa| empresa.to_lowercase().contains(needle_lower))
        || result.linha_encontrada.to_lowercase().contains(needle_lower)
        || result.contexto.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Default)]
pub struct ResultStore {
    results: Vec<AnalysisResult>,
    filtered: Vec<AnalysisResult>,
    filters: Filters,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole result set and resets the view to an unfiltered copy.
    /// Both criteria are cleared, including the company text.
    pub fn set_results(&mut self, results: Vec<AnalysisResult>) {
        self.filtered = results.clone();
        self.results = results;
        self.filters = Filters::default();
    }

    /// Recomputes the filtered view from scratch.
    pub fn apply_filters(&mut self, tributo: Option<&str>, empresa: &str) {
        self.filters = Filters {
            tributo: tributo.filter(|t| !t.is_empty()).map(str::to_string),
            empresa: empresa.to_string(),
        };
        let empresa_lower = empresa.to_lowercase();
        self.filtered = self
            .results
            .iter()
            .filter(|r| self.filters.matches(r, &empresa_lower))
            .cloned()
            .collect();
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn filtered(&self) -> &[AnalysisResult] {
        &self.filtered
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Entry of the filtered view, as numbered in the rendered table.
    pub fn get(&self, index: usize) -> Option<&AnalysisResult> {
        self.filtered.get(index)
    }

    /// Distinct tributo values in first-seen order.
    pub fn tributo_options(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for result in &self.results {
            if !seen.iter().any(|t| *t == result.tributo) {
                seen.push(result.tributo.clone());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fixtures::result;

    fn sample() -> Vec<AnalysisResult> {
        vec![
            result("ICMS", "ICMS pago: R$100", &["ACME LTDA"], "nota da Acme"),
            result("ISS", "ISS retido", &[], "prestador BETA SERVICOS"),
            result("ICMS", "ICMS diferido", &["GAMMA S/A"], "sem empresa"),
            result("PIS", "PIS sobre faturamento da acme", &[], "..."),
        ]
    }

    fn store() -> ResultStore {
        let mut store = ResultStore::new();
        store.set_results(sample());
        store
    }

    fn is_subsequence(sub: &[AnalysisResult], full: &[AnalysisResult]) -> bool {
        let mut it = full.iter();
        sub.iter().all(|s| it.any(|f| f == s))
    }

    #[test]
    fn set_results_copies_into_filtered_view() {
        let store = store();
        assert_eq!(store.filtered(), store.results());
        assert_eq!(store.results().len(), 4);
    }

    #[test]
    fn empty_filters_are_identity() {
        let mut store = store();
        store.apply_filters(Some("ICMS"), "acme");
        store.apply_filters(None, "");
        assert_eq!(store.filtered(), sample().as_slice());
        store.apply_filters(Some(""), "");
        assert_eq!(store.filtered(), sample().as_slice());
    }

    #[test]
    fn tributo_filter_is_exact_and_case_sensitive() {
        let mut store = store();
        store.apply_filters(Some("ICMS"), "");
        assert_eq!(store.filtered().len(), 2);
        assert!(store.filtered().iter().all(|r| r.tributo == "ICMS"));

        store.apply_filters(Some("icms"), "");
        assert!(store.filtered().is_empty());

        store.apply_filters(Some("ICM"), "");
        assert!(store.filtered().is_empty());
    }

    #[test]
    fn empresa_filter_searches_companies_line_and_context() {
        let mut store = store();
        store.apply_filters(None, "AcMe");
        let linhas: Vec<_> = store
            .filtered()
            .iter()
            .map(|r| r.linha_encontrada.as_str())
            .collect();
        assert_eq!(linhas, vec!["ICMS pago: R$100", "PIS sobre faturamento da acme"]);

        store.apply_filters(None, "beta");
        assert_eq!(store.filtered().len(), 1);
        assert_eq!(store.filtered()[0].tributo, "ISS");

        store.apply_filters(None, "gamma");
        assert_eq!(store.filtered().len(), 1);
        assert_eq!(store.filtered()[0].linha_encontrada, "ICMS diferido");
    }

    #[test]
    fn filters_combine_with_and() {
        let mut store = store();
        store.apply_filters(Some("ICMS"), "acme");
        assert_eq!(store.filtered().len(), 1);
        assert_eq!(store.filtered()[0].linha_encontrada, "ICMS pago: R$100");

        store.apply_filters(Some("ISS"), "acme");
        assert!(store.filtered().is_empty());
    }

    #[test]
    fn filtered_view_is_always_ordered_subsequence() {
        let mut store = store();
        for tributo in [None, Some("ICMS"), Some("ISS"), Some("PIS"), Some("COFINS")] {
            for empresa in ["", "a", "acme", "S", "zzz", "..."] {
                store.apply_filters(tributo, empresa);
                assert!(
                    is_subsequence(store.filtered(), store.results()),
                    "not a subsequence for {tributo:?}/{empresa:?}"
                );
            }
        }
    }

    #[test]
    fn new_results_reset_filters() {
        let mut store = store();
        store.apply_filters(Some("ICMS"), "acme");
        store.set_results(vec![result("ISS", "ISS", &[], "")]);
        assert_eq!(store.filters(), &Filters::default());
        assert_eq!(store.filtered().len(), 1);
    }

    #[test]
    fn tributo_options_are_distinct_in_first_seen_order() {
        let store = store();
        assert_eq!(store.tributo_options(), vec!["ICMS", "ISS", "PIS"]);
    }

    #[test]
    fn get_indexes_the_filtered_view() {
        let mut store = store();
        store.apply_filters(Some("ISS"), "");
        assert_eq!(store.get(0).map(|r| r.tributo.as_str()), Some("ISS"));
        assert!(store.get(1).is_none());
    }
}
