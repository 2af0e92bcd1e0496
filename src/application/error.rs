use chrono::NaiveDate;

use crate::domain::error::LoanRejection;
use crate::domain::model::id::Isbn;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Rejected(#[from] LoanRejection),

    #[error("book not found in catalog: {0}")]
    BookNotFound(Isbn),

    #[error("book already registered: {0}")]
    DuplicateBook(Isbn),

    #[error("no active loan for book: {0}")]
    NoActiveLoan(Isbn),

    #[error("return date {returned_on} is before loan start {start_date} for book: {isbn}")]
    InvalidReturnDate {
        isbn: Isbn,
        start_date: NaiveDate,
        returned_on: NaiveDate,
    },

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    /// 貸出拒否（想定内の結果）ならその種別を返す。
    pub fn rejection(&self) -> Option<LoanRejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.rejection().is_some()
    }
}
