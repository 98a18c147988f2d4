use futures::future::{BoxFuture, FutureExt};
use vfq_common::Result;

use crate::provider::{CollectionProvider, CollectionQuery, RawRecord};

/// In-memory collection provider used by tests and embedded deployments.
///
/// Scores records by cosine similarity when the request carries a query
/// vector, sorts nearest-first, and truncates to `top_k`. Metadata
/// filtering is deliberately left to the caller: when a request carries a
/// filter, the full candidate set is returned instead of a `fetch_limit`
/// truncation, so the executor's re-filtering never loses matching rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    records: Vec<RawRecord>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn insert(&mut self, record: RawRecord) {
        self.records.push(record);
    }
}

impl CollectionProvider for MemoryProvider {
    fn query<'a>(&'a self, request: CollectionQuery) -> BoxFuture<'a, Result<Vec<RawRecord>>> {
        let mut records = self.records.clone();
        async move {
            if let Some(query_vec) = &request.vector {
                for record in &mut records {
                    record.score = record
                        .vector
                        .as_ref()
                        .and_then(|v| cosine_similarity(v, query_vec));
                }
                records.sort_by(|a, b| {
                    score_desc(a.score, b.score).then_with(|| a.id.cmp(&b.id))
                });
                if let Some(k) = request.top_k {
                    records.truncate(k);
                }
            }
            if request.filter.is_none() {
                if let Some(limit) = request.fetch_limit {
                    records.truncate(limit);
                }
            }
            Ok(records)
        }
        .boxed()
    }
}

fn score_desc(a: Option<f32>, b: Option<f32>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
