//! Batch orchestration over a prospect table
//!
//! Rows are selected, audited in fixed-size concurrent groups, and the whole
//! table is checkpointed after each group.

mod orchestrator;
mod table;

pub use orchestrator::{is_candidate, run_batch, BatchOptions, BatchSummary};
pub use table::{read_rows, CsvTableSink, ProspectRow, ProspectTable, TableSink};
