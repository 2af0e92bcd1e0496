use chrono::{Local, NaiveDate};

use crate::domain::error::LoanRejection;
use crate::domain::model::book::Book;
use crate::domain::model::id::Isbn;
use crate::domain::model::loan::Loan;
use crate::domain::policy;
use crate::domain::repository::{AddOutcome, AppendOutcome, Catalog, LoanLedger};

use super::error::AppError;

/// 貸出窓口のユースケース。
/// CatalogとLoanLedgerを参照して貸出可否を判定し、許可時に貸出を記録する。
/// 自身は可変状態を持たない。
pub struct LoanDesk<C: Catalog, L: LoanLedger> {
    catalog: C,
    ledger: L,
}

impl<C: Catalog, L: LoanLedger> LoanDesk<C, L> {
    pub fn new(catalog: C, ledger: L) -> Self {
        Self { catalog, ledger }
    }

    /// 貸出中のレコードがあるか。
    pub fn is_on_loan(&self, isbn: &Isbn) -> Result<bool, AppError> {
        Ok(self
            .ledger
            .find_active_by_isbn(isbn)
            .map_err(storage)?
            .is_some())
    }

    /// 回文ISBN（館内閲覧専用）か。
    pub fn is_restricted_identifier(isbn: &Isbn) -> bool {
        policy::is_restricted_identifier(isbn.as_str())
    }

    pub fn compute_due_date(isbn: &Isbn, start: NaiveDate) -> Option<NaiveDate> {
        let due = policy::compute_due_date(isbn.as_str(), start);
        tracing::debug!(%isbn, %start, ?due, "computed due date");
        due
    }

    /// 本日付で貸し出す。
    pub fn lend(&self, isbn: &Isbn, borrower: &str) -> Result<Loan, AppError> {
        self.lend_on(isbn, borrower, Local::now().date_naive())
    }

    /// 指定日付で貸し出す。
    ///
    /// 判定順: 貸出中 → 回文ISBN。最初に該当した拒否理由を返す。
    pub fn lend_on(
        &self,
        isbn: &Isbn,
        borrower: &str,
        start: NaiveDate,
    ) -> Result<Loan, AppError> {
        if self.is_on_loan(isbn)? {
            return Err(reject(isbn, LoanRejection::BookUnavailable));
        }
        if Self::is_restricted_identifier(isbn) {
            return Err(reject(isbn, LoanRejection::RestrictedToOnSite));
        }

        let due_date = Self::compute_due_date(isbn, start);
        let book = self
            .catalog
            .get_by_isbn(isbn)
            .map_err(storage)?
            .ok_or_else(|| AppError::BookNotFound(isbn.clone()))?;

        let loan = Loan::new(start, book, due_date, borrower);
        match self.ledger.append(loan.clone()).map_err(storage)? {
            AppendOutcome::Recorded => {
                tracing::info!(
                    %isbn,
                    borrower,
                    loan_id = %loan.id(),
                    due = ?loan.due_date(),
                    "loan granted"
                );
                Ok(loan)
            }
            AppendOutcome::AlreadyOnLoan => {
                tracing::warn!(%isbn, "concurrent loan recorded first");
                Err(reject(isbn, LoanRejection::BookUnavailable))
            }
        }
    }

    /// 返却を記録する。
    ///
    /// 返却日が貸出開始日より前なら何も記録せず `InvalidReturnDate` を返す。
    pub fn return_book(&self, isbn: &Isbn, returned_on: NaiveDate) -> Result<Loan, AppError> {
        let active = self
            .ledger
            .find_active_by_isbn(isbn)
            .map_err(storage)?
            .ok_or_else(|| AppError::NoActiveLoan(isbn.clone()))?;
        if returned_on < active.start_date() {
            return Err(AppError::InvalidReturnDate {
                isbn: isbn.clone(),
                start_date: active.start_date(),
                returned_on,
            });
        }

        let loan = self
            .ledger
            .record_return(isbn, returned_on)
            .map_err(storage)?
            .ok_or_else(|| AppError::NoActiveLoan(isbn.clone()))?;
        tracing::info!(%isbn, loan_id = %loan.id(), %returned_on, "book returned");
        Ok(loan)
    }

    /// 状態を問わず最新の貸出を返す。
    pub fn find_loan(&self, isbn: &Isbn) -> Result<Option<Loan>, AppError> {
        self.ledger.find_by_isbn(isbn).map_err(storage)
    }

    pub fn register_book(&self, book: Book) -> Result<(), AppError> {
        let isbn = book.isbn().clone();
        match self.catalog.add(book).map_err(storage)? {
            AddOutcome::Added => {
                tracing::info!(%isbn, "book registered");
                Ok(())
            }
            AddOutcome::AlreadyRegistered => Err(AppError::DuplicateBook(isbn)),
        }
    }

    pub fn get_book(&self, isbn: &Isbn) -> Result<Option<Book>, AppError> {
        self.catalog.get_by_isbn(isbn).map_err(storage)
    }
}

fn storage<E: std::error::Error + Send + Sync + 'static>(e: E) -> AppError {
    AppError::Storage(Box::new(e))
}

fn reject(isbn: &Isbn, rejection: LoanRejection) -> AppError {
    tracing::info!(%isbn, ?rejection, "loan refused");
    AppError::Rejected(rejection)
}
