//! Concurrent scanning of many rows.
//!
//! Rows are queued as tasks and drained by a fixed set of worker threads. Each
//! task owns fresh record instances made from the caller's templates, so workers
//! share nothing mutable; the header leaves are shared read-only. Every task
//! publishes exactly one [`BatchRow`] on the result channel, which is closed once
//! all workers have finished.
use crate::binding::node::HeaderNode;
use crate::binding::path::MatchMode;
use crate::binding::record::Record;
use crate::binding::record::RecordHandle;
use crate::binding::scan::fit_row;
use crate::binding::scan::scan_record;
use crate::binding::BindingError;
use crate::binding::ScanSettings;
use crate::helpers::recover::panic_message;
use crate::helpers::recover::recover;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use log::debug;
use log::trace;
use log::warn;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

/// Outcome of scanning one row of a batch.
pub struct BatchRow {
    /// Index of the row in the input batch
    pub row: usize,
    /// One instance per template, in template order. On error these hold the
    /// fields scanned before the failing cell.
    pub records: Vec<Box<dyn RecordHandle>>,
    pub error: Option<BindingError>,
}

impl BatchRow {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The record at `index`, if it is of type `R`.
    pub fn record<R: Record>(&self, index: usize) -> Option<&R> {
        self.records.get(index)?.downcast_ref::<R>()
    }
}

struct Task {
    row: usize,
    cells: Vec<String>,
    records: Vec<Box<dyn RecordHandle>>,
}

impl HeaderNode {
    /// Scans every row concurrently, binding fields by full header path.
    ///
    /// Results arrive in completion order, not input order; use [`BatchRow::row`]
    /// to restore it. The channel can hold every result, so workers never wait
    /// on a slow consumer.
    pub fn scan_all(
        &self,
        rows: Vec<Vec<String>>,
        templates: &[&dyn RecordHandle],
    ) -> Receiver<BatchRow> {
        self.scan_all_with(rows, templates, MatchMode::Exact)
    }

    /// Like [`HeaderNode::scan_all`] with relative (suffix) path matching.
    pub fn scan_all_relative(
        &self,
        rows: Vec<Vec<String>>,
        templates: &[&dyn RecordHandle],
    ) -> Receiver<BatchRow> {
        self.scan_all_with(rows, templates, MatchMode::Relative)
    }

    fn scan_all_with(
        &self,
        rows: Vec<Vec<String>>,
        templates: &[&dyn RecordHandle],
        mode: MatchMode,
    ) -> Receiver<BatchRow> {
        let settings = self.settings();
        let leaves = Arc::clone(self.leaf_index());
        let row_count = rows.len();
        let (result_sender, result_receiver) = bounded::<BatchRow>(row_count);
        let (task_sender, task_receiver) = unbounded::<Task>();

        for (row, cells) in rows.into_iter().enumerate() {
            let records = templates.iter().map(|template| template.fresh()).collect();
            if task_sender.send(Task { row, cells, records }).is_err() {
                break;
            }
        }
        drop(task_sender);

        let workers = settings.worker_count().min(row_count);
        let handles: Vec<JoinHandle<()>> = (0..workers)
            .filter_map(|index| {
                let tasks = task_receiver.clone();
                let results = result_sender.clone();
                let leaves = Arc::clone(&leaves);
                thread::Builder::new()
                    .name(format!("scan-worker-{index}"))
                    .spawn(move || drain(&tasks, &results, &leaves, settings, mode))
                    .map_err(|error| warn!("Spawn scan worker {} failed: {}", index, error))
                    .ok()
            })
            .collect();
        debug!("Scanning {} rows with {} workers", row_count, handles.len());

        let supervise = move || {
            for handle in handles {
                if let Err(payload) = handle.join() {
                    warn!("Scan worker panicked: {}", panic_message(payload.as_ref()));
                }
            }
            // Rows left behind by failed or missing workers
            drain(&task_receiver, &result_sender, &leaves, settings, mode);
            drop(result_sender);
            debug!("Scanned {} rows", row_count);
        };
        if let Err(error) = thread::Builder::new()
            .name("scan-supervisor".to_owned())
            .spawn(supervise)
        {
            warn!("Spawn scan supervisor failed: {}", error);
        }
        result_receiver
    }
}

fn drain(
    tasks: &Receiver<Task>,
    results: &Sender<BatchRow>,
    leaves: &[HeaderNode],
    settings: ScanSettings,
    mode: MatchMode,
) {
    for Task { row, cells, mut records } in tasks.iter() {
        let error = recover("scan_all", || {
            let cells = fit_row(&cells, leaves.len());
            for record in records.iter_mut() {
                scan_record(leaves, settings, &cells, &mut **record, mode)?;
            }
            Ok(())
        })
        .err();
        trace!("Scanned row {} (ok: {})", row, error.is_none());
        if results.send(BatchRow { row, records, error }).is_err() {
            // Receiver dropped, nobody wants the remaining rows
            break;
        }
    }
}
