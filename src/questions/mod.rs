//! Question bank: records, parsing, shuffling and the embedded fallback

pub mod bank;
pub mod csv;
pub mod embedded;
pub mod question;
pub mod source;

pub use bank::{parse_questions, LoadReport, QuestionBank, SkipReason};
pub use question::{
    ChoiceLabel, ConnectPuzzle, MultipleChoice, Payload, PictureMatch, Question, QuestionType,
    WordPuzzle, CONNECT_DOT_ORDER,
};
pub use source::QuestionSource;
