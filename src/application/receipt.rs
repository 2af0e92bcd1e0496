use chrono::NaiveDate;

use crate::domain::model::loan::Loan;

/// 貸出票をMarkdownで生成する。
pub fn render_receipt(loan: &Loan) -> String {
    let book = loan.book();
    let mut out = String::from("# Loan receipt\n\n");
    out.push_str(&format!("- Book: {} ({})\n", book.title(), book.isbn()));
    out.push_str(&format!("- Borrower: {}\n", loan.borrower()));
    out.push_str(&format!("- Lent on: {}\n", format_date(loan.start_date())));
    match loan.due_date() {
        Some(due) => out.push_str(&format!("- Return by: {}\n", format_date(due))),
        None => out.push_str("- Return by: open-ended (no return date)\n"),
    }
    if let Some(returned) = loan.returned_on() {
        out.push_str(&format!("- Returned on: {}\n", format_date(returned)));
    }
    out
}

/// `2019-07-17 (Wed)`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}
