use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::book::Book;
use super::id::{Isbn, LoanId};

/// 貸出記録。LoanDeskが貸出許可時に一度だけ生成し、Ledgerが所有する。
/// 貸出に関するフィールドは生成後に変更されない。返却日のみLedgerが記録する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    start_date: NaiveDate,
    borrower: String,
    book: Book,
    /// 返却期限。桁合計ルールを満たさないISBNではNone（期限なし）
    due_date: Option<NaiveDate>,
    #[serde(default)]
    returned_on: Option<NaiveDate>,
}

impl Loan {
    pub fn new(
        start_date: NaiveDate,
        book: Book,
        due_date: Option<NaiveDate>,
        borrower: impl Into<String>,
    ) -> Self {
        Self {
            id: LoanId::new(),
            start_date,
            borrower: borrower.into(),
            book,
            due_date,
            returned_on: None,
        }
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn borrower(&self) -> &str {
        &self.borrower
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn isbn(&self) -> &Isbn {
        self.book.isbn()
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn returned_on(&self) -> Option<NaiveDate> {
        self.returned_on
    }

    /// 返却が記録されていない貸出。
    pub fn is_active(&self) -> bool {
        self.returned_on.is_none()
    }

    /// 返却日を記録する。Ledger実装からのみ呼ばれる想定。
    pub fn mark_returned(&mut self, returned_on: NaiveDate) {
        self.returned_on = Some(returned_on);
    }
}
