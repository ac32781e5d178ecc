//! Enrichment trait
use super::Segment;

/// Enrichments attach derived data (speaker information, for example) to a segment.
///
/// Enrichment runs on producer workers, on segments exclusively owned by the worker.
/// It must not fail: missing data leaves the segment as is.
pub trait Enrich: Sync {
    fn enrich(&self, segment: &mut Segment);
}

/// Enricher enables enrichment chaining, adding multiple enrichers and
/// doing the enrichment process in one step.
#[derive(Default)]
pub struct Enricher(Vec<Box<dyn Enrich>>);

impl Enricher {
    pub fn add(&mut self, enricher: Box<dyn Enrich>) -> &mut Enricher {
        self.0.push(enricher);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Enrich for Enricher {
    fn enrich(&self, segment: &mut Segment) {
        for enricher in &self.0 {
            enricher.enrich(segment);
        }
    }
}
