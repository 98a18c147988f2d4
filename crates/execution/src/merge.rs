use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use serde_json::Value;
use vfq_planner::{OrderBy, OrderKey};

use crate::result::ResultRow;

/// Merge-order comparison: `Less` means "comes first in the result".
///
/// Rows without a key value sort last regardless of direction; ties break
/// by record id so that completion and insertion order can never leak into
/// result order.
pub(crate) fn compare_rows(a: &ResultRow, b: &ResultRow, order: Option<&OrderBy>) -> Ordering {
    let primary = match order {
        Some(order) => match &order.key {
            OrderKey::Similarity => compare_scores(a.score, b.score, order.descending),
            OrderKey::Field(_) => {
                compare_values(a.order_value.as_ref(), b.order_value.as_ref(), order.descending)
            }
        },
        None => Ordering::Equal,
    };
    primary.then_with(|| a.record_id.cmp(&b.record_id))
}

fn compare_scores(a: Option<f32>, b: Option<f32>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.total_cmp(&b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = value_cmp(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn value_cmp(a: &Value, b: &Value) -> Ordering {
    fn type_rank(v: &Value) -> u8 {
        match v {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            Value::Bool(_) => 2,
            _ => 3,
        }
    }
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

struct MergeEntry {
    row: ResultRow,
    shard: usize,
    order: Option<OrderBy>,
}

impl PartialEq for MergeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for MergeEntry {}
impl PartialOrd for MergeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for MergeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_rows(&self.row, &other.row, self.order.as_ref())
            .then_with(|| self.shard.cmp(&other.shard))
    }
}

/// K-way merge of per-collection result runs.
///
/// Each shard's rows must already be sorted by `order` (the
/// single-collection executor guarantees this). The output is globally
/// sorted, deduplicated by record id (first occurrence in merge order
/// wins), and has `offset`/`limit` applied over the deduplicated sequence.
pub fn merge_rows(
    shards: Vec<Vec<ResultRow>>,
    order: Option<&OrderBy>,
    offset: usize,
    limit: Option<usize>,
) -> Vec<ResultRow> {
    let mut cursors: Vec<std::vec::IntoIter<ResultRow>> =
        shards.into_iter().map(Vec::into_iter).collect();

    let mut heap: BinaryHeap<Reverse<MergeEntry>> = BinaryHeap::with_capacity(cursors.len());
    for (shard, cursor) in cursors.iter_mut().enumerate() {
        if let Some(row) = cursor.next() {
            heap.push(Reverse(MergeEntry {
                row,
                shard,
                order: order.cloned(),
            }));
        }
    }

    let target = limit.map(|l| l.saturating_add(offset));
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    while let Some(Reverse(entry)) = heap.pop() {
        if let Some(next) = cursors[entry.shard].next() {
            heap.push(Reverse(MergeEntry {
                row: next,
                shard: entry.shard,
                order: order.cloned(),
            }));
        }
        if seen.insert(entry.row.record_id.clone()) {
            merged.push(entry.row);
            if target.is_some_and(|t| merged.len() >= t) {
                break;
            }
        }
    }

    merged
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
