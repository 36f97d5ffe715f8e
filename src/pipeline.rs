//! Pipeline runs.
//!
//! A [`Pipeline`] owns the processed-data cache and the run state of each
//! selector. Category runs parse, pivot and analyze their input files and,
//! on success, replace their cache slot. Summary runs merge the three cached
//! results. Every failure is reported through [`PipelineOutcome`]; nothing is
//! returned as an error to the caller.

use crate::analysis::{self, Criteria};
use crate::cache::ProcessedDataCache;
use crate::error::PipelineError;
use crate::ingest::{load_files, parse_files};
use crate::models::{Category, InputFile, PipelineOutcome, RunState, Selector, SummaryRow};
use crate::report::{export_category, export_summary};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Runs categories and summaries against a shared cache.
#[derive(Debug, Default)]
pub struct Pipeline {
    criteria: Criteria,
    cache: ProcessedDataCache,
    states: HashMap<Selector, RunState>,
}

impl Pipeline {
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria,
            cache: ProcessedDataCache::new(),
            states: HashMap::new(),
        }
    }

    /// Start from an existing cache.
    pub fn with_cache(criteria: Criteria, cache: ProcessedDataCache) -> Self {
        Self {
            criteria,
            cache,
            states: HashMap::new(),
        }
    }

    pub fn cache(&self) -> &ProcessedDataCache {
        &self.cache
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Current state of a selector.
    pub fn state(&self, selector: Selector) -> RunState {
        self.states.get(&selector).cloned().unwrap_or_default()
    }

    /// Return a selector to idle, discarding its cached result.
    pub fn reset(&mut self, selector: Selector) {
        if let Selector::Category(category) = selector {
            if self.cache.clear(category).is_some() {
                debug!("Discarded cached {} result", category);
            }
        }
        self.states.insert(selector, RunState::Idle);
    }

    /// Run a selector. `files` is ignored for the summary.
    pub fn run(&mut self, selector: Selector, files: &[InputFile]) -> PipelineOutcome {
        // Precondition failures never enter Running, so the state is left as is.
        if let Err(e) = self.check_ready(selector, files) {
            warn!("{} not started: {}", selector, e);
            return PipelineOutcome::failed(e.to_string());
        }

        self.states.insert(selector, RunState::Running);
        info!("Running {} analysis", selector);

        let result = match selector {
            Selector::Category(category) => self.run_category(category, files),
            Selector::Summary => self.run_summary(),
        };
        self.finish(selector, result)
    }

    /// Read `paths` and run a category over their contents.
    ///
    /// A file that cannot be read fails the run like any other fault: the
    /// state becomes `Failed` and the cached result is kept.
    pub async fn run_paths(&mut self, category: Category, paths: &[PathBuf]) -> PipelineOutcome {
        let selector = Selector::from(category);
        if paths.is_empty() {
            let e = PipelineError::NoInput(category);
            warn!("{} not started: {}", selector, e);
            return PipelineOutcome::failed(e.to_string());
        }

        self.states.insert(selector, RunState::Running);
        info!("Running {} analysis over {} files", selector, paths.len());

        let result = match load_files(paths).await {
            Ok(files) => self.run_category(category, &files),
            Err(e) => Err(e),
        };
        self.finish(selector, result)
    }

    /// Region code to criteria met, recomputed from the cache.
    pub fn criteria_map(&self) -> Result<BTreeMap<String, u8>, PipelineError> {
        let rows = analysis::merge_cached(&self.cache)?;
        Ok(analysis::criteria_by_region(&rows))
    }

    /// Summary rows, recomputed from the cache.
    pub fn summary_rows(&self) -> Result<Vec<SummaryRow>, PipelineError> {
        analysis::merge_cached(&self.cache)
    }

    fn check_ready(&self, selector: Selector, files: &[InputFile]) -> Result<(), PipelineError> {
        match selector {
            Selector::Category(category) if files.is_empty() => {
                Err(PipelineError::NoInput(category))
            }
            Selector::Category(_) => Ok(()),
            Selector::Summary => self.cache.require_all().map(|_| ()),
        }
    }

    fn run_category(
        &mut self,
        category: Category,
        files: &[InputFile],
    ) -> Result<PipelineOutcome, PipelineError> {
        let records = parse_files(files);
        debug!("{}: {} records from {} files", category, records.len(), files.len());

        let result = analysis::analyze(category, &records, &self.criteria);
        let artifact = export_category(&result)?;
        let message = format!(
            "{} analysis complete: {} regions, {} met",
            category,
            result.rows.len(),
            result.met_count()
        );

        self.cache.store(result);
        Ok(PipelineOutcome::succeeded(message, artifact))
    }

    fn run_summary(&self) -> Result<PipelineOutcome, PipelineError> {
        let rows = analysis::merge_cached(&self.cache)?;
        let counts = analysis::CriteriaCounts::from_rows(&rows);
        let artifact = export_summary(&rows, &self.cache)?;
        let message = format!(
            "Summary complete: {} regions ({})",
            counts.total(),
            counts
        );
        Ok(PipelineOutcome::succeeded(message, artifact))
    }

    fn finish(
        &mut self,
        selector: Selector,
        result: Result<PipelineOutcome, PipelineError>,
    ) -> PipelineOutcome {
        match result {
            Ok(outcome) => {
                info!("{}", outcome.message);
                self.states.insert(selector, RunState::Success);
                outcome
            }
            Err(e) => {
                let message = e.to_string();
                error!("{} failed: {}", selector, message);
                self.states
                    .insert(selector, RunState::Failed(message.clone()));
                PipelineOutcome::failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const POPULATION: &str =
        "2000^A^to_in_001^100\n2010^A^to_in_001^70\n2015^A^to_in_001^60\n2015^B^to_in_001^10\n";
    const BUSINESS: &str = "2019^A^cp_bnu_001^50\n2020^A^cp_bnu_001^80\n2020^C^cp_bnu_001^3\n";
    const BUILDINGS: &str = "2023^A^ho_yr_001^40\n2023^A^ho_yr_007^60\n2023^D^ho_yr_002^9\n";

    fn file(content: &str) -> Vec<InputFile> {
        vec![InputFile::new("input.txt", content)]
    }

    fn populated() -> Pipeline {
        let mut pipeline = Pipeline::default();
        pipeline.run(Category::Demographic.into(), &file(POPULATION));
        pipeline.run(Category::Economic.into(), &file(BUSINESS));
        pipeline.run(Category::PhysicalStock.into(), &file(BUILDINGS));
        pipeline
    }

    #[test]
    fn test_no_input_fails_without_touching_cache() {
        let mut pipeline = Pipeline::default();
        let outcome = pipeline.run(Category::Demographic.into(), &[]);

        assert!(!outcome.success);
        assert!(outcome.message.contains("No input files"));
        assert!(outcome.preview.is_none());
        assert!(pipeline.cache().get(Category::Demographic).is_none());
        assert_eq!(pipeline.state(Category::Demographic.into()), RunState::Idle);
    }

    #[test]
    fn test_category_run_caches_result() {
        let mut pipeline = Pipeline::default();
        assert_eq!(pipeline.state(Category::Demographic.into()), RunState::Idle);

        let outcome = pipeline.run(Category::Demographic.into(), &file(POPULATION));

        assert!(outcome.success);
        assert_eq!(outcome.message, "Population analysis complete: 2 regions, 1 met");
        assert!(outcome.text_artifact.is_some());
        assert!(outcome.spreadsheet_artifact.is_some());
        assert_eq!(outcome.preview.unwrap().rows.len(), 2);
        assert_eq!(pipeline.state(Category::Demographic.into()), RunState::Success);
        assert!(pipeline.cache().get(Category::Demographic).is_some());
    }

    #[test]
    fn test_failed_run_keeps_previous_result() {
        let mut pipeline = Pipeline::default();
        pipeline.run(Category::Economic.into(), &file(BUSINESS));
        let outcome = pipeline.run(Category::Economic.into(), &[]);

        assert!(!outcome.success);
        assert_eq!(pipeline.state(Category::Economic.into()), RunState::Success);
        let cached = pipeline.cache().get(Category::Economic).unwrap();
        assert_eq!(cached.rows.len(), 2);
    }

    #[test]
    fn test_summary_with_missing_category_fails() {
        let mut pipeline = Pipeline::default();
        pipeline.run(Category::Demographic.into(), &file(POPULATION));
        pipeline.run(Category::Economic.into(), &file(BUSINESS));

        let outcome = pipeline.run(Selector::Summary, &[]);

        assert!(!outcome.success);
        assert!(outcome.message.contains("Buildings"));
        assert!(!outcome.message.contains("Population,"));
        assert!(outcome.preview.is_none());
        assert!(outcome.text_artifact.is_none());
    }

    #[test]
    fn test_summary_run() {
        let mut pipeline = populated();
        let outcome = pipeline.run(Selector::Summary, &[]);

        assert!(outcome.success, "{}", outcome.message);
        let preview = outcome.preview.unwrap();
        let codes: Vec<_> = preview
            .rows
            .iter()
            .map(|row| row["Region Code"].as_str())
            .collect();
        // A meets population and buildings; B, C and D meet nothing.
        assert_eq!(codes, vec!["A", "B", "C", "D"]);
        assert_eq!(preview.rows[0]["Criteria Met"], "2");
        assert_eq!(pipeline.state(Selector::Summary), RunState::Success);
    }

    #[test]
    fn test_criteria_map() {
        let pipeline = populated();
        let map = pipeline.criteria_map().unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map["A"], 2);
        assert_eq!(map["D"], 0);
    }

    #[test]
    fn test_reset_clears_slot() {
        let mut pipeline = populated();
        pipeline.reset(Category::Economic.into());

        assert_eq!(pipeline.state(Category::Economic.into()), RunState::Idle);
        assert!(pipeline.cache().get(Category::Economic).is_none());
        assert!(!pipeline.run(Selector::Summary, &[]).success);
    }

    #[test]
    fn test_sustained_threshold_follows_criteria() {
        let drops = "2018^A^to_in_001^100\n2019^A^to_in_001^99\n2020^A^to_in_001^98\n";

        let mut lenient = Pipeline::default();
        let outcome = lenient.run(Category::Demographic.into(), &file(drops));
        assert!(outcome.message.ends_with("1 met"));

        let mut strict = Pipeline::new(Criteria {
            min_consecutive_drops: 3,
        });
        let outcome = strict.run(Category::Demographic.into(), &file(drops));
        assert!(outcome.message.ends_with("0 met"));
    }

    #[test]
    fn test_with_cache_merges_without_rerunning() {
        let cache = populated().cache().clone();
        let pipeline = Pipeline::with_cache(Criteria::default(), cache);

        let rows = pipeline.summary_rows().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].region_code, "A");
        assert_eq!(rows[0].criteria_met, 2);
        assert_eq!(pipeline.criteria().min_consecutive_drops, 2);
        assert_eq!(pipeline.state(Selector::Summary), RunState::Idle);
    }

    #[tokio::test]
    async fn test_run_paths_reads_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pop.txt");
        fs::write(&path, POPULATION).unwrap();

        let mut pipeline = Pipeline::default();
        let outcome = pipeline
            .run_paths(Category::Demographic, &[path])
            .await;

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(pipeline.state(Category::Demographic.into()), RunState::Success);
        assert!(pipeline.cache().get(Category::Demographic).is_some());
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("biz.txt");
        fs::write(&good, BUSINESS).unwrap();
        let missing = dir.path().join("gone.txt");

        let mut pipeline = Pipeline::default();
        assert!(pipeline.run_paths(Category::Economic, &[good.clone()]).await.success);

        let outcome = pipeline.run_paths(Category::Economic, &[good, missing]).await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("gone.txt"));
        assert!(outcome.text_artifact.is_none());
        assert!(matches!(
            pipeline.state(Category::Economic.into()),
            RunState::Failed(ref message) if message.contains("gone.txt")
        ));
        assert_eq!(pipeline.cache().get(Category::Economic).unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_run_paths_without_paths_stays_idle() {
        let mut pipeline = Pipeline::default();
        let outcome = pipeline.run_paths(Category::PhysicalStock, &[]).await;

        assert!(!outcome.success);
        assert_eq!(pipeline.state(Category::PhysicalStock.into()), RunState::Idle);
    }
}
