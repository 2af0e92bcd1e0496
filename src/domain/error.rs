pub const BOOK_UNAVAILABLE: &str = "book is not available";
pub const RESTRICTED_TO_ON_SITE: &str =
    "palindromic-identifier books may only be used on the premises";

/// 貸出拒否。通常運用で発生する想定内の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoanRejection {
    #[error("{}", BOOK_UNAVAILABLE)]
    BookUnavailable,

    #[error("{}", RESTRICTED_TO_ON_SITE)]
    RestrictedToOnSite,
}

impl LoanRejection {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BookUnavailable => BOOK_UNAVAILABLE,
            Self::RestrictedToOnSite => RESTRICTED_TO_ON_SITE,
        }
    }
}
