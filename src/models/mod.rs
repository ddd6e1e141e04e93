pub mod processor;
pub mod query_result;
pub mod run_plan;
pub mod widgets;

pub use processor::{CostTable, ProcessorSlot, ProcessorTier};
pub use query_result::{BenchmarkRecord, QueryResult, QueryStatus};
pub use run_plan::RunPlan;
pub use widgets::{ExtractedWidgets, ResponseBody};
