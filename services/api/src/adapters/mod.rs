pub mod db;
pub mod schedule_llm;
pub mod tip_llm;

pub use db::DbAdapter;
pub use schedule_llm::OpenAiPlannerAdapter;
pub use tip_llm::OpenAiTipAdapter;
