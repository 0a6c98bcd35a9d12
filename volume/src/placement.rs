//! Counts classified entries into the ledger, growing it at the leading edge.

use tracing::trace;

use crate::classifier::ClassifiedEntry;
use crate::error::LedgerError;
use crate::ledger::BucketLedger;
use crate::sink::RenderSink;

/// A sink mutation mirroring one ledger change, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOp {
    Update { index: usize, count: u64 },
    Append { count: u64, label: String },
    RemoveOldest,
}

impl ChartOp {
    pub fn apply<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        match self {
            ChartOp::Update { index, count } => sink.update_point(*index, *count),
            ChartOp::Append { count, label } => sink.append_point(*count, label),
            ChartOp::RemoveOldest => sink.remove_oldest_point(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub ops: Vec<ChartOp>,
    /// Entries counted into an existing bucket.
    pub placed: usize,
    /// Entries that opened a new bucket.
    pub appended: usize,
    /// Entries older than the window.
    pub dropped: usize,
}

impl Placement {
    /// Whether an existing point changed and needs a redraw.
    pub fn has_updates(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, ChartOp::Update { .. }))
    }
}

/// Places each entry, in arrival order.
///
/// An entry lands in the bucket whose range holds it. An entry past the newest
/// bucket opens exactly one new bucket one interval ahead, however far in the
/// future it is. Entries before the window are dropped.
pub fn place(
    ledger: &mut BucketLedger,
    entries: &[ClassifiedEntry],
) -> Result<Placement, LedgerError> {
    let mut placement = Placement::default();

    for entry in entries {
        if let Some((index, count)) = ledger.increment_latest_matching(entry.timestamp) {
            placement.ops.push(ChartOp::Update { index, count });
            placement.placed += 1;
            continue;
        }

        let next_start = ledger.next_start()?;
        if entry.timestamp > next_start {
            let label = ledger.label_for(next_start);
            let dropped = ledger.append(1, label.clone())?;
            placement.ops.push(ChartOp::Append { count: 1, label });
            if dropped.is_some() {
                placement.ops.push(ChartOp::RemoveOldest);
            }
            placement.appended += 1;
        } else {
            trace!(timestamp = entry.timestamp, "Entry predates window");
            placement.dropped += 1;
        }
    }

    Ok(placement)
}
