//! Store of the latest successful result per category.

use crate::error::PipelineError;
use crate::models::{Category, CategoryResult};

/// Holds the most recent successful [`CategoryResult`] of each category.
///
/// A slot is only ever replaced wholesale by a successful run, so a failed
/// run leaves the previous result in place.
#[derive(Debug, Clone, Default)]
pub struct ProcessedDataCache {
    demographic: Option<CategoryResult>,
    economic: Option<CategoryResult>,
    physical_stock: Option<CategoryResult>,
}

impl ProcessedDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, category: Category) -> &Option<CategoryResult> {
        match category {
            Category::Demographic => &self.demographic,
            Category::Economic => &self.economic,
            Category::PhysicalStock => &self.physical_stock,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut Option<CategoryResult> {
        match category {
            Category::Demographic => &mut self.demographic,
            Category::Economic => &mut self.economic,
            Category::PhysicalStock => &mut self.physical_stock,
        }
    }

    pub fn get(&self, category: Category) -> Option<&CategoryResult> {
        self.slot(category).as_ref()
    }

    /// Store a result in its category's slot, replacing the previous one.
    pub fn store(&mut self, result: CategoryResult) {
        let category = result.category;
        *self.slot_mut(category) = Some(result);
    }

    /// Empty one slot, returning what it held.
    pub fn clear(&mut self, category: Category) -> Option<CategoryResult> {
        self.slot_mut(category).take()
    }

    pub fn clear_all(&mut self) {
        for category in Category::ALL {
            self.clear(category);
        }
    }

    /// Categories without a cached result, in merge order.
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.slot(*category).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// All three results in merge order, or the list of missing categories.
    pub fn require_all(
        &self,
    ) -> Result<(&CategoryResult, &CategoryResult, &CategoryResult), PipelineError> {
        match (&self.demographic, &self.economic, &self.physical_stock) {
            (Some(demographic), Some(economic), Some(stock)) => Ok((demographic, economic, stock)),
            _ => Err(PipelineError::MissingPrerequisite {
                missing: self.missing(),
            }),
        }
    }
}
