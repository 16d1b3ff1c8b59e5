//! Process-wide store of accessible figure aggregates.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::core::{AxisId, FigureId};
use crate::error::{CaptureError, CaptureResult};
use crate::plot::{CaptureKey, PlotRecord};

use super::document::FigureDocument;

/// How an attached record landed in its aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Inserted,
    /// Same capture key seen before; the record was swapped in place.
    Replaced,
    /// The record took over the slot of a lower-priority bar-family record
    /// on the same axis.
    Superseded,
    /// A higher-priority bar-family record already describes the axis.
    Skipped,
}

/// Accessible representation of one figure: its records in capture order.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureAggregate {
    figure: FigureId,
    document_id: Uuid,
    title: Option<String>,
    records: IndexMap<CaptureKey, PlotRecord>,
}

impl FigureAggregate {
    #[must_use]
    pub fn new(figure: FigureId) -> Self {
        Self {
            figure,
            document_id: Uuid::new_v4(),
            title: None,
            records: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn figure(&self) -> FigureId {
        self.figure
    }

    #[must_use]
    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.filter(|title| !title.trim().is_empty());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PlotRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn record(&self, key: CaptureKey) -> Option<&PlotRecord> {
        self.records.get(&key)
    }

    pub fn records_for_axis(&self, axis: AxisId) -> impl Iterator<Item = &PlotRecord> {
        self.records.values().filter(move |record| record.axis == axis)
    }

    /// Inserts or replaces a record, applying bar-family priority.
    pub fn insert(&mut self, record: PlotRecord) -> AttachOutcome {
        let key = record.capture_key();
        if let Some(slot) = self.records.get_mut(&key) {
            *slot = record;
            return AttachOutcome::Replaced;
        }

        if key.plot_type.is_bar_family() {
            let rival = self.records.keys().position(|existing| {
                existing.axis == key.axis
                    && existing.plot_type != key.plot_type
                    && existing.plot_type.is_bar_family()
                    && existing.plot_type.priority() != key.plot_type.priority()
            });
            if let Some(index) = rival {
                let existing = self.records.get_index(index).map(|(k, _)| k.plot_type);
                if existing.is_some_and(|existing| existing.priority() > key.plot_type.priority())
                {
                    return AttachOutcome::Skipped;
                }
                self.records.shift_remove_index(index);
                self.records.shift_insert(index, key, record);
                return AttachOutcome::Superseded;
            }
        }

        self.records.insert(key, record);
        AttachOutcome::Inserted
    }

    /// Renderer document of the current records.
    #[must_use]
    pub fn document(&self, dedupe_smooth_lines: bool) -> FigureDocument {
        FigureDocument::from_records(
            self.document_id.to_string(),
            self.title.clone(),
            self.records.values(),
            dedupe_smooth_lines,
        )
    }
}

/// Closed figures remembered by a registry built with
/// [`FigureRegistry::new`].
pub const DEFAULT_TOMBSTONE_CAPACITY: usize = 256;

#[derive(Debug)]
struct RegistryState {
    figures: HashMap<FigureId, FigureAggregate>,
    /// Recently evicted figures, oldest first.
    evicted: IndexSet<FigureId>,
    tombstone_capacity: usize,
}

impl RegistryState {
    fn new(tombstone_capacity: usize) -> Self {
        Self {
            figures: HashMap::new(),
            evicted: IndexSet::new(),
            tombstone_capacity,
        }
    }

    fn bury(&mut self, figure: FigureId) {
        self.evicted.insert(figure);
        while self.evicted.len() > self.tombstone_capacity {
            if let Some(released) = self.evicted.shift_remove_index(0) {
                trace!(figure = %released, "released figure tombstone");
            }
        }
    }

    fn aggregate_mut(&mut self, figure: FigureId) -> CaptureResult<&mut FigureAggregate> {
        if self.evicted.contains(&figure) {
            return Err(CaptureError::FigureEvicted(figure));
        }
        let aggregate = self.figures.entry(figure).or_insert_with(|| {
            debug!(%figure, "creating figure aggregate");
            FigureAggregate::new(figure)
        });
        check_owner(figure, aggregate)?;
        Ok(aggregate)
    }
}

fn check_owner(figure: FigureId, aggregate: &FigureAggregate) -> CaptureResult<()> {
    debug_assert_eq!(
        aggregate.figure, figure,
        "aggregate stored under another figure's key"
    );
    if aggregate.figure != figure {
        return Err(CaptureError::RegistryCorruption(format!(
            "aggregate for {} stored under key {figure}",
            aggregate.figure
        )));
    }
    Ok(())
}

/// Concurrency-safe map from figure to its accessible aggregate.
///
/// All state sits behind one lock and every operation takes it exactly once,
/// so get-or-create plus insert is atomic.
///
/// Evicted figures leave a tombstone that refuses late captures. Only the
/// most recent `tombstone_capacity` tombstones are kept; older stale handles
/// are refused by the host, which no longer knows their axes.
#[derive(Debug)]
pub struct FigureRegistry {
    state: Mutex<RegistryState>,
}

impl Default for FigureRegistry {
    fn default() -> Self {
        Self::with_tombstone_capacity(DEFAULT_TOMBSTONE_CAPACITY)
    }
}

impl FigureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tombstone_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::new(capacity)),
        }
    }

    /// Process-wide default registry.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<FigureRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(FigureRegistry::new())))
    }

    /// Snapshot of the figure's aggregate, creating an empty one if needed.
    pub fn get_or_create(&self, figure: FigureId) -> CaptureResult<FigureAggregate> {
        let mut state = self.state.lock();
        state.aggregate_mut(figure).map(|aggregate| aggregate.clone())
    }

    pub fn attach(&self, figure: FigureId, record: PlotRecord) -> CaptureResult<AttachOutcome> {
        let mut state = self.state.lock();
        let aggregate = state.aggregate_mut(figure)?;
        let key = record.capture_key();
        let outcome = aggregate.insert(record);
        trace!(
            %figure,
            axis = %key.axis,
            plot_type = %key.plot_type,
            ?outcome,
            records = aggregate.len(),
            "attached plot record"
        );
        Ok(outcome)
    }

    pub fn set_title(&self, figure: FigureId, title: Option<String>) -> CaptureResult<()> {
        let mut state = self.state.lock();
        state.aggregate_mut(figure)?.set_title(title);
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, figure: FigureId) -> Option<FigureAggregate> {
        let state = self.state.lock();
        let aggregate = state.figures.get(&figure)?;
        check_owner(figure, aggregate).ok()?;
        Some(aggregate.clone())
    }

    /// Drops the figure's aggregate and refuses further captures for it.
    /// Returns `true` when an aggregate was removed.
    pub fn evict(&self, figure: FigureId) -> bool {
        let mut state = self.state.lock();
        state.bury(figure);
        let removed = state.figures.remove(&figure).is_some();
        if removed {
            debug!(%figure, "evicted figure aggregate");
        }
        removed
    }

    #[must_use]
    pub fn is_evicted(&self, figure: FigureId) -> bool {
        self.state.lock().evicted.contains(&figure)
    }

    /// Number of evicted figures still refused by the registry.
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.state.lock().evicted.len()
    }

    /// Renderer document for the figure, with smooth/line dedup applied.
    pub fn document(&self, figure: FigureId) -> CaptureResult<FigureDocument> {
        self.document_with(figure, true)
    }

    pub fn document_with(
        &self,
        figure: FigureId,
        dedupe_smooth_lines: bool,
    ) -> CaptureResult<FigureDocument> {
        let state = self.state.lock();
        match state.figures.get(&figure) {
            Some(aggregate) => {
                check_owner(figure, aggregate)?;
                Ok(aggregate.document(dedupe_smooth_lines))
            }
            None if state.evicted.contains(&figure) => Err(CaptureError::FigureEvicted(figure)),
            None => Err(CaptureError::InvalidData(format!(
                "no captures recorded for figure {figure}"
            ))),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().figures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().figures.is_empty()
    }

    /// Registered figures in allocation order.
    #[must_use]
    pub fn figures(&self) -> Vec<FigureId> {
        let mut figures: Vec<FigureId> = self.state.lock().figures.keys().copied().collect();
        figures.sort_unstable();
        figures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GridPosition, PlotType};
    use crate::extract::FormatHints;
    use crate::plot::{AxisLabels, PlotData};

    fn record(axis: u64, plot_type: PlotType) -> PlotRecord {
        PlotRecord {
            plot_type,
            axis: AxisId::from_raw(axis),
            grid: GridPosition::default(),
            orientation: None,
            data: PlotData::empty(plot_type),
            labels: AxisLabels::default(),
            format: FormatHints::default(),
            element_ids: Vec::new(),
            element_paths: Vec::new(),
        }
    }

    #[test]
    fn grouped_bars_supersede_plain_bars_in_place() {
        let mut aggregate = FigureAggregate::new(FigureId::from_raw(1));
        aggregate.insert(record(1, PlotType::Bar));
        aggregate.insert(record(2, PlotType::Line));
        assert_eq!(
            aggregate.insert(record(1, PlotType::Stacked)),
            AttachOutcome::Superseded
        );
        assert_eq!(
            aggregate.insert(record(1, PlotType::Bar)),
            AttachOutcome::Skipped
        );
        let order: Vec<PlotType> = aggregate.records().map(|r| r.plot_type).collect();
        assert_eq!(order, vec![PlotType::Stacked, PlotType::Line]);
    }

    #[test]
    fn evicted_figures_stay_closed() {
        let registry = FigureRegistry::new();
        let figure = FigureId::from_raw(42);
        registry
            .attach(figure, record(1, PlotType::Scatter))
            .expect("attach");
        assert!(registry.evict(figure));
        assert!(!registry.evict(figure));
        assert!(matches!(
            registry.attach(figure, record(1, PlotType::Scatter)),
            Err(CaptureError::FigureEvicted(_))
        ));
        assert!(registry.lookup(figure).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn tombstones_keep_only_the_most_recent_evictions() {
        let registry = FigureRegistry::with_tombstone_capacity(2);
        for raw in 1..=4 {
            registry.evict(FigureId::from_raw(raw));
        }
        assert_eq!(registry.tombstones(), 2);
        assert!(!registry.is_evicted(FigureId::from_raw(2)));
        assert!(registry.is_evicted(FigureId::from_raw(3)));
        assert!(registry.is_evicted(FigureId::from_raw(4)));

        registry.evict(FigureId::from_raw(3));
        assert_eq!(registry.tombstones(), 2);
        assert!(registry.is_evicted(FigureId::from_raw(4)));
    }
}
