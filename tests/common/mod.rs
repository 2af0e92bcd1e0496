//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;

use loan_desk::application::service::LoanDesk;
use loan_desk::domain::model::book::Book;
use loan_desk::domain::model::id::Isbn;
use loan_desk::domain::model::loan::Loan;
use loan_desk::domain::repository::{AddOutcome, AppendOutcome, Catalog, LoanLedger};

// =============================================================================
// InMemoryLibrary — テスト用Catalog + LoanLedger
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("in-memory store error")]
pub struct InMemoryError;

#[derive(Default)]
struct State {
    books: Vec<Book>,
    loans: Vec<Loan>,
}

/// ファイルI/O不要のインメモリ実装。Cloneは同じ状態を共有する。
#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    state: Rc<RefCell<State>>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let lib = Self::new();
        lib.state.borrow_mut().books.extend(books);
        lib
    }

    pub fn loan_count(&self) -> usize {
        self.state.borrow().loans.len()
    }

    /// 台帳に直接貸出を書き込む（Deskを経由しない）。
    pub fn seed_loan(&self, loan: Loan) {
        self.state.borrow_mut().loans.push(loan);
    }
}

impl Catalog for InMemoryLibrary {
    type Error = InMemoryError;

    fn get_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, Self::Error> {
        Ok(self
            .state
            .borrow()
            .books
            .iter()
            .find(|b| b.isbn() == isbn)
            .cloned())
    }

    fn add(&self, book: Book) -> Result<AddOutcome, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.books.iter().any(|b| b.isbn() == book.isbn()) {
            return Ok(AddOutcome::AlreadyRegistered);
        }
        state.books.push(book);
        Ok(AddOutcome::Added)
    }
}

impl LoanLedger for InMemoryLibrary {
    type Error = InMemoryError;

    fn find_active_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Ok(self
            .state
            .borrow()
            .loans
            .iter()
            .find(|l| l.isbn() == isbn && l.is_active())
            .cloned())
    }

    fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Ok(self
            .state
            .borrow()
            .loans
            .iter()
            .rev()
            .find(|l| l.isbn() == isbn)
            .cloned())
    }

    fn append(&self, loan: Loan) -> Result<AppendOutcome, Self::Error> {
        let mut state = self.state.borrow_mut();
        if state
            .loans
            .iter()
            .any(|l| l.isbn() == loan.isbn() && l.is_active())
        {
            return Ok(AppendOutcome::AlreadyOnLoan);
        }
        state.loans.push(loan);
        Ok(AppendOutcome::Recorded)
    }

    fn record_return(
        &self,
        isbn: &Isbn,
        returned_on: NaiveDate,
    ) -> Result<Option<Loan>, Self::Error> {
        let mut state = self.state.borrow_mut();
        let loan = state
            .loans
            .iter_mut()
            .find(|l| l.isbn() == isbn && l.is_active());
        Ok(loan.map(|l| {
            l.mark_returned(returned_on);
            l.clone()
        }))
    }
}

// =============================================================================
// Collaborator doubles
// =============================================================================

/// 常に失敗するLedger。コラボレータ障害の伝播確認用。
pub struct FailingLedger;

impl LoanLedger for FailingLedger {
    type Error = InMemoryError;

    fn find_active_by_isbn(&self, _isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Err(InMemoryError)
    }

    fn find_by_isbn(&self, _isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Err(InMemoryError)
    }

    fn append(&self, _loan: Loan) -> Result<AppendOutcome, Self::Error> {
        Err(InMemoryError)
    }

    fn record_return(
        &self,
        _isbn: &Isbn,
        _returned_on: NaiveDate,
    ) -> Result<Option<Loan>, Self::Error> {
        Err(InMemoryError)
    }
}

/// 空きを報告するが、appendでは常に他の貸出に先を越されるLedger。
pub struct RacingLedger;

impl LoanLedger for RacingLedger {
    type Error = InMemoryError;

    fn find_active_by_isbn(&self, _isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Ok(None)
    }

    fn find_by_isbn(&self, _isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        Ok(None)
    }

    fn append(&self, _loan: Loan) -> Result<AppendOutcome, Self::Error> {
        Ok(AppendOutcome::AlreadyOnLoan)
    }

    fn record_return(
        &self,
        _isbn: &Isbn,
        _returned_on: NaiveDate,
    ) -> Result<Option<Loan>, Self::Error> {
        Ok(None)
    }
}

// =============================================================================
// BookBuilder — テスト用Book作成ヘルパー
// =============================================================================

pub const DEFAULT_TITLE: &str = "Cronica de una muerte anunciada";
/// 桁合計10（期限なし）、回文でない
pub const DEFAULT_ISBN: &str = "1234";

pub struct BookBuilder {
    isbn: String,
    title: String,
}

impl Default for BookBuilder {
    fn default() -> Self {
        Self {
            isbn: DEFAULT_ISBN.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isbn(mut self, isbn: &str) -> Self {
        self.isbn = isbn.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn build(self) -> Book {
        Book::new(self.isbn, self.title)
    }
}

/// 指定Bookを登録済みのDeskと、状態確認用の共有ストアを返す。
pub fn desk_with(
    books: impl IntoIterator<Item = Book>,
) -> (LoanDesk<InMemoryLibrary, InMemoryLibrary>, InMemoryLibrary) {
    let lib = InMemoryLibrary::with_books(books);
    (LoanDesk::new(lib.clone(), lib.clone()), lib)
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
