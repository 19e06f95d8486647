use std::sync::Arc;

use chrono_tz::Tz;

use profetas_core::board::MatchBoard;
use profetas_core::loader::MatchLoader;
use profetas_core::submission::SubmissionFlow;
use profetas_types::api::PaymentInfo;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub loader: MatchLoader,
    pub board: MatchBoard,
    pub flow: SubmissionFlow,
    pub payment: PaymentInfo,
    /// Zone kick-off times are shown in.
    pub display_tz: Tz,
}

pub const DEFAULT_BANK: &str = "BBVA / Spin";
pub const DEFAULT_ACCOUNT: &str = "1234 5678 9012 3456";

/// "$15.00 MXN" for the standard fee.
pub fn format_amount(amount: f64) -> String {
    format!("${:.2} MXN", amount)
}

pub fn payment_info(amount: f64, bank: impl Into<String>, account: impl Into<String>) -> PaymentInfo {
    PaymentInfo {
        amount: format_amount(amount),
        bank: bank.into(),
        account: account.into(),
    }
}
