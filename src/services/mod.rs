pub mod prompt_builder;
pub mod query_parser;
pub mod query_service;
pub mod result_saver;

pub use query_service::{QueryService, WaitPolicy};
pub use result_saver::ResultSaver;
