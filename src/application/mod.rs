pub mod answer_service;
pub mod indexing_service;

pub use answer_service::AnswerService;
pub use indexing_service::IndexingService;
