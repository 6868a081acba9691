use serde::{Deserialize, Serialize};
use std::fmt;

/// 币种（ISO 4217 代码，统一小写存储）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_lowercase())
    }

    pub fn usd() -> Self {
        Self::new("usd")
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// 展示用货币符号，未知币种返回 None
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "usd" | "cad" | "aud" => Some("$"),
            "eur" => Some("€"),
            "gbp" => Some("£"),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_ascii_uppercase())
    }
}

/// 货币金额（最小货币单位，避免浮点数精度问题）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// 金额（分）
    pub amount_minor: i64,

    /// 币种
    pub currency: Currency,
}

impl Money {
    pub fn from_minor(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    pub fn to_minor(&self) -> i64 {
        self.amount_minor
    }
}

impl fmt::Display for Money {
    // 只在展示时换算为主单位，全程整数运算
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        let (major, minor) = (abs / 100, abs % 100);

        match self.currency.symbol() {
            Some(symbol) => write!(f, "{}{}{}.{:02}", sign, symbol, major, minor),
            None => write!(f, "{} {}{}.{:02}", self.currency, sign, major, minor),
        }
    }
}
