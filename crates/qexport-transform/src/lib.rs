//! Export record production for questionnaire exports
//!
//! Stages between the persistence layer and the archive:
//!
//! - [`plan`]: structure rows → [`ExportMetaInfo`] with the ordered [`ColumnMeta`] list
//! - [`RowResolver`]: instance row → one [`Cell`](qexport_model::Cell) per column, deciding
//!   between values and missing codes
//! - [`AnswersTransform`] / [`CodebookTransform`]: feature-specific CSV records
//! - [`CsvEncoder`]: record → delimited text chunk
//!
//! # Example
//!
//! ```
//! use qexport_model::{AnswerType, StructureRow};
//! use qexport_transform::plan;
//!
//! let row: StructureRow = serde_json::from_value(serde_json::json!({
//!     "questionnaire_id": 1,
//!     "questionnaire_name": "Symptome",
//!     "questionnaire_version": 1,
//!     "question_id": 10,
//!     "question_position": 1,
//!     "answer_option_id": 100,
//!     "answer_option_position": 1,
//!     "answer_type": "sample"
//! }))
//! .unwrap();
//!
//! let meta = plan(&[row]).unwrap();
//! let names: Vec<_> = meta.column_names().collect();
//! assert_eq!(names, ["q1_sym_v1_1_1_1", "q1_sym_v1_1_1_2"]);
//! assert_eq!(meta.columns[0].answer_type, AnswerType::Sample);
//! ```

pub mod answers;
pub mod codebook;
pub mod encoder;
pub mod error;
pub mod format;
pub mod naming;
pub mod planner;
pub mod resolver;

pub use answers::{AnswersTransform, BASE_COLUMNS};
pub use codebook::{CodebookRecord, CodebookTransform, answer_option_columns};
pub use encoder::{CsvEncoder, DEFAULT_DELIMITER};
pub use error::{TransformError, TransformResult};
pub use format::ValueFormatter;
pub use planner::{
    ColumnConditions, ColumnKind, ColumnMeta, ExportMetaInfo, QuestionMetaInfo, SAMPLE_SLOTS,
    plan,
};
pub use resolver::RowResolver;
