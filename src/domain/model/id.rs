use serde::{Deserialize, Serialize};
use std::fmt;

/// 図書の識別コード（ISBN相当）。
/// 正規化は行わない。ハイフン等の区切り文字もそのまま規則判定に使われる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn(String);

impl Isbn {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Isbn {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Isbn {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(uuid::Uuid);

impl Default for LoanId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl LoanId {
    pub fn new() -> Self {
        Self::default()
    }

    /// 短縮ID（UUIDの先頭8文字）
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
