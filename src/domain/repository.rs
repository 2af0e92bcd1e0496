use chrono::NaiveDate;

use super::model::book::Book;
use super::model::id::Isbn;
use super::model::loan::Loan;

/// `Catalog::add` の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyRegistered,
}

/// `LoanLedger::append` の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Recorded,
    /// 同じISBNの貸出中レコードが既にあるため追加しなかった
    AlreadyOnLoan,
}

/// 蔵書カタログの抽象。Infra層が実装する。
pub trait Catalog {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, Self::Error>;
    fn add(&self, book: Book) -> Result<AddOutcome, Self::Error>;
}

/// 貸出台帳の抽象。Infra層が実装する。
///
/// `append` は「ISBNごとに貸出中は最大1件」をアトミックに保証しなければならない。
/// 事前の `find_active_by_isbn` だけでは並行貸出の競合を防げない。
pub trait LoanLedger {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 返却されていない貸出。
    fn find_active_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error>;
    /// 状態を問わず最新の貸出。
    fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error>;
    fn append(&self, loan: Loan) -> Result<AppendOutcome, Self::Error>;
    /// 貸出中レコードに返却日を記録する。貸出中がなければ `None`。
    fn record_return(&self, isbn: &Isbn, returned_on: NaiveDate)
        -> Result<Option<Loan>, Self::Error>;
}
