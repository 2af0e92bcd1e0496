//! Loan rules: on-site restriction and due-date computation.
//!
//! 全て純粋関数。ISBNは生の文字列のまま扱い、大文字小文字・区切り文字の正規化はしない。

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// 基本貸出日数
pub const BASE_LOAN_DAYS: u64 = 14;

/// 桁合計がこの値を超えるISBNのみ返却期限を持つ
pub const DIGIT_SUM_THRESHOLD: u32 = 30;

/// 返却期限にしない曜日
pub const REST_DAY: Weekday = Weekday::Sun;

/// Unicode一般カテゴリNd（10進数字）の各系列の「0」のコードポイント（Unicode 15.1）。
/// Nd文字は必ず0〜9の連続10文字で並ぶため、値は `cp - zero` で求まる。
const DECIMAL_ZEROS: &[u32] = &[
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6,
    0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// 10進数字（Nd）ならその値。全角 `９` やアラビア・インド数字 `٣` も含む。
pub fn decimal_value(c: char) -> Option<u32> {
    let cp = c as u32;
    let idx = DECIMAL_ZEROS.partition_point(|&zero| zero <= cp);
    let zero = DECIMAL_ZEROS[idx.checked_sub(1)?];
    let value = cp - zero;
    (value < 10).then_some(value)
}

/// ISBNに含まれる10進数字の合計。数字以外は0として扱う。
pub fn digit_sum(isbn: &str) -> u32 {
    isbn.chars().filter_map(decimal_value).sum()
}

/// 文字単位の回文判定。回文ISBNは館内閲覧専用。
pub fn is_restricted_identifier(isbn: &str) -> bool {
    isbn.chars().eq(isbn.chars().rev())
}

/// 貸出開始日から返却期限を求める。
///
/// - 桁合計が [`DIGIT_SUM_THRESHOLD`] 以下なら `None`（期限なし）
/// - 月〜木開始は期間内に日曜が2回入るため +2日、金〜日開始は +3日
/// - 結果が [`REST_DAY`] なら翌日へずらす
///
/// 日付が表現範囲を超える場合も `None`。
pub fn compute_due_date(isbn: &str, start: NaiveDate) -> Option<NaiveDate> {
    if digit_sum(isbn) <= DIGIT_SUM_THRESHOLD {
        return None;
    }

    let days = BASE_LOAN_DAYS + extra_days(start.weekday());
    let candidate = start.checked_add_days(Days::new(days))?;

    if candidate.weekday() == REST_DAY {
        candidate.succ_opt()
    } else {
        Some(candidate)
    }
}

fn extra_days(start: Weekday) -> u64 {
    match start {
        Weekday::Mon | Weekday::Tue | Weekday::Wed | Weekday::Thu => 2,
        Weekday::Fri | Weekday::Sat | Weekday::Sun => 3,
    }
}
