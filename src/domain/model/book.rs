use serde::{Deserialize, Serialize};

use super::id::Isbn;

/// 蔵書。Catalogに登録された後は変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    isbn: Isbn,
    title: String,
}

impl Book {
    pub fn new(isbn: impl Into<Isbn>, title: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
        }
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}
