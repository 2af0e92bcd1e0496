use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::model::book::Book;
use crate::domain::model::id::Isbn;
use crate::domain::model::loan::Loan;
use crate::domain::repository::{AddOutcome, AppendOutcome, Catalog, LoanLedger};

#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// ファイルの中身。蔵書と貸出台帳を1ファイルに保持する。
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    books: Vec<Book>,
    #[serde(default)]
    loans: Vec<Loan>,
}

/// JSONファイルによるCatalog + LoanLedger実装。
///
/// load → mutate → save は二重のロック内で行う。
/// - プロセス内: Cloneが共有するMutex
/// - インスタンス間・プロセス間: 隣接する `<name>.lock` ファイルへの排他アドバイザリロック
///
/// 同じパスに対して別々に `new` したインスタンスや別プロセスでも、書き込みは直列化される。
/// ロックはアドバイザリなので、このストアを経由しない書き込みは防げない。
#[derive(Clone)]
pub struct JsonLibraryStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    /// 全貸出（記録順）。
    pub fn loans(&self) -> Result<Vec<Loan>, JsonStoreError> {
        let _guard = self.guard()?;
        Ok(self.load()?.loans)
    }

    fn guard(&self) -> Result<StoreGuard<'_>, JsonStoreError> {
        let mutex = self
            .inner
            .lock
            .lock()
            .map_err(|_| JsonStoreError::LockPoisoned)?;
        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.inner.path.with_extension("lock"))?;
        FileExt::lock_exclusive(&file)?;
        Ok(StoreGuard {
            _file: file,
            _mutex: mutex,
        })
    }

    fn load(&self) -> Result<LibraryFile, JsonStoreError> {
        if !self.inner.path.exists() {
            return Ok(LibraryFile::default());
        }
        let content = std::fs::read_to_string(&self.inner.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, file: &LibraryFile) -> Result<(), JsonStoreError> {
        let content = serde_json::to_string_pretty(file)?;
        let tmp = self.inner.path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }
}

/// 保持している間、両方のロックを持つ。ファイルを閉じるとファイルロックは解放される。
struct StoreGuard<'a> {
    _file: File,
    _mutex: MutexGuard<'a, ()>,
}

impl Catalog for JsonLibraryStore {
    type Error = JsonStoreError;

    fn get_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, Self::Error> {
        let _guard = self.guard()?;
        let file = self.load()?;
        Ok(file.books.into_iter().find(|b| b.isbn() == isbn))
    }

    fn add(&self, book: Book) -> Result<AddOutcome, Self::Error> {
        let _guard = self.guard()?;
        let mut file = self.load()?;
        if file.books.iter().any(|b| b.isbn() == book.isbn()) {
            return Ok(AddOutcome::AlreadyRegistered);
        }
        file.books.push(book);
        self.save(&file)?;
        Ok(AddOutcome::Added)
    }
}

impl LoanLedger for JsonLibraryStore {
    type Error = JsonStoreError;

    fn find_active_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        let _guard = self.guard()?;
        let file = self.load()?;
        Ok(file
            .loans
            .into_iter()
            .find(|l| l.isbn() == isbn && l.is_active()))
    }

    fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Loan>, Self::Error> {
        let _guard = self.guard()?;
        let file = self.load()?;
        Ok(file.loans.into_iter().rev().find(|l| l.isbn() == isbn))
    }

    fn append(&self, loan: Loan) -> Result<AppendOutcome, Self::Error> {
        let _guard = self.guard()?;
        let mut file = self.load()?;
        if file
            .loans
            .iter()
            .any(|l| l.isbn() == loan.isbn() && l.is_active())
        {
            return Ok(AppendOutcome::AlreadyOnLoan);
        }
        file.loans.push(loan);
        self.save(&file)?;
        Ok(AppendOutcome::Recorded)
    }

    fn record_return(
        &self,
        isbn: &Isbn,
        returned_on: NaiveDate,
    ) -> Result<Option<Loan>, Self::Error> {
        let _guard = self.guard()?;
        let mut file = self.load()?;
        let Some(loan) = file
            .loans
            .iter_mut()
            .find(|l| l.isbn() == isbn && l.is_active())
        else {
            return Ok(None);
        };
        loan.mark_returned(returned_on);
        let returned = loan.clone();
        self.save(&file)?;
        Ok(Some(returned))
    }
}
