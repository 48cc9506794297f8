//! Data types and the Excel number-format codes they produce.

use std::fmt;
use std::str::FromStr;

use crate::culture::{find_culture, Culture, CurrencyPlacement};
use crate::error::{DesignError, Result};

/// Excel accepts at most 30 decimal places in a format code.
pub const MAX_DECIMALS: u8 = 30;

/// How negative numbers are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeNumberStyle {
    /// `-1.00`
    #[default]
    Minus,
    /// `-1.00` in red
    RedMinus,
    /// `1.00` in red, no sign
    Red,
    /// `(1.00)`
    Parentheses,
    /// `(1.00)` in red
    RedParentheses,
}

impl FromStr for NegativeNumberStyle {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minus" => Ok(NegativeNumberStyle::Minus),
            "red-minus" => Ok(NegativeNumberStyle::RedMinus),
            "red" => Ok(NegativeNumberStyle::Red),
            "parentheses" => Ok(NegativeNumberStyle::Parentheses),
            "red-parentheses" => Ok(NegativeNumberStyle::RedParentheses),
            other => Err(DesignError::InvalidDesign(format!(
                "unknown negative number style: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberDesign {
    pub decimals: u8,
    pub thousands_separator: bool,
    pub negative: NegativeNumberStyle,
}

impl Default for NumberDesign {
    /// Two decimals with a thousands separator, minus sign for negatives.
    fn default() -> Self {
        NumberDesign {
            decimals: 2,
            thousands_separator: true,
            negative: NegativeNumberStyle::Minus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDesign {
    pub decimals: u8,
    pub negative: NegativeNumberStyle,
    /// Overrides the culture's currency symbol.
    pub symbol: Option<String>,
    /// Formats with another culture than the designer's.
    pub culture: Option<String>,
}

impl Default for CurrencyDesign {
    fn default() -> Self {
        CurrencyDesign {
            decimals: 2,
            negative: NegativeNumberStyle::Minus,
            symbol: None,
            culture: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    #[default]
    Short,
    Long,
    Iso,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeStyle {
    Short,
    #[default]
    Long,
    /// Elapsed hours, e.g. `[h]:mm:ss`.
    Duration,
}

/// The data type of a cell, which decides its number-format code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    General,
    Text,
    Number(NumberDesign),
    Currency(CurrencyDesign),
    Accounting(CurrencyDesign),
    Percent { decimals: u8 },
    Scientific { decimals: u8 },
    /// Fractions with up to `digits` digits in the denominator.
    Fraction { digits: u8 },
    Date(DateStyle),
    Time(TimeStyle),
    DateTime,
    Custom(String),
}

fn decimal_part(decimals: u8) -> String {
    if decimals == 0 {
        String::new()
    } else {
        format!(".{}", "0".repeat(decimals as usize))
    }
}

fn integer_part(thousands_separator: bool) -> &'static str {
    if thousands_separator {
        "#,##0"
    } else {
        "0"
    }
}

/// Joins the positive body with the negative section required by `style`.
fn with_negative(body: &str, style: NegativeNumberStyle) -> String {
    match style {
        NegativeNumberStyle::Minus => body.to_string(),
        NegativeNumberStyle::RedMinus => format!("{body};[Red]-{body}"),
        NegativeNumberStyle::Red => format!("{body};[Red]{body}"),
        NegativeNumberStyle::Parentheses => format!("{body}_);({body})"),
        NegativeNumberStyle::RedParentheses => format!("{body}_);[Red]({body})"),
    }
}

fn currency_token(symbol: &str, culture: &Culture) -> String {
    format!("[${}-{}]", symbol, culture.lcid_hex())
}

impl CurrencyDesign {
    fn resolve(&self, culture: &'static Culture) -> Result<(&'static Culture, String)> {
        let culture = match &self.culture {
            Some(name) => find_culture(name)?,
            None => culture,
        };
        let symbol = self
            .symbol
            .clone()
            .unwrap_or_else(|| culture.currency_symbol.to_string());
        Ok((culture, symbol))
    }
}

impl DataType {
    pub fn number(decimals: u8) -> Self {
        DataType::Number(NumberDesign {
            decimals,
            ..Default::default()
        })
    }

    pub fn currency(decimals: u8) -> Self {
        DataType::Currency(CurrencyDesign {
            decimals,
            ..Default::default()
        })
    }

    pub fn percent(decimals: u8) -> Self {
        DataType::Percent { decimals }
    }

    /// Checks the limits Excel puts on format codes.
    pub fn validate(&self) -> Result<()> {
        let check_decimals = |decimals: u8| {
            if decimals > MAX_DECIMALS {
                Err(DesignError::InvalidDesign(format!(
                    "{} decimal places exceed the maximum of {}",
                    decimals, MAX_DECIMALS
                )))
            } else {
                Ok(())
            }
        };
        match self {
            DataType::Number(n) => check_decimals(n.decimals),
            DataType::Currency(c) | DataType::Accounting(c) => {
                check_decimals(c.decimals)?;
                if let Some(symbol) = &c.symbol {
                    if symbol.is_empty() || symbol.contains(']') || symbol.contains('"') {
                        return Err(DesignError::InvalidDesign(format!(
                            "currency symbol {:?} cannot be used in a format code",
                            symbol
                        )));
                    }
                }
                if let Some(name) = &c.culture {
                    find_culture(name)?;
                }
                Ok(())
            }
            DataType::Percent { decimals } | DataType::Scientific { decimals } => {
                check_decimals(*decimals)
            }
            DataType::Fraction { digits } => {
                if (1..=3).contains(digits) {
                    Ok(())
                } else {
                    Err(DesignError::InvalidDesign(format!(
                        "fraction digits must be 1 to 3, got {}",
                        digits
                    )))
                }
            }
            DataType::Custom(code) if code.trim().is_empty() => Err(DesignError::InvalidDesign(
                "custom format code is empty".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Builds the Excel format code for this data type.
    pub fn format_code(&self, culture: &'static Culture) -> Result<String> {
        let code = match self {
            DataType::General => "General".to_string(),
            DataType::Text => "@".to_string(),
            DataType::Number(n) => with_negative(
                &format!(
                    "{}{}",
                    integer_part(n.thousands_separator),
                    decimal_part(n.decimals)
                ),
                n.negative,
            ),
            DataType::Currency(c) => {
                let (culture, symbol) = c.resolve(culture)?;
                let token = currency_token(&symbol, culture);
                let number = format!("#,##0{}", decimal_part(c.decimals));
                let body = match culture.currency_placement {
                    CurrencyPlacement::Prefix => format!("{token}{number}"),
                    CurrencyPlacement::PrefixSpace => format!("{token} {number}"),
                    CurrencyPlacement::Suffix => format!("{number}{token}"),
                    CurrencyPlacement::SuffixSpace => format!("{number} {token}"),
                };
                with_negative(&body, c.negative)
            }
            DataType::Accounting(c) => {
                let (culture, symbol) = c.resolve(culture)?;
                let token = currency_token(&symbol, culture);
                let number = format!("#,##0{}", decimal_part(c.decimals));
                let zero = format!("\"-\"{}", "?".repeat(c.decimals as usize));
                if culture.currency_placement.is_prefix() {
                    format!(
                        "_({token}* {number}_);_({token}* ({number});_({token}* {zero}_);_(@_)"
                    )
                } else {
                    format!(
                        "_-* {number} {token}_-;-* {number} {token}_-;_-* {zero} {token}_-;_-@_-"
                    )
                }
            }
            DataType::Percent { decimals } => format!("0{}%", decimal_part(*decimals)),
            DataType::Scientific { decimals } => format!("0{}E+00", decimal_part(*decimals)),
            DataType::Fraction { digits } => {
                let width = (*digits).clamp(1, 3) as usize;
                format!("# {}/{}", "?".repeat(width), "?".repeat(width))
            }
            DataType::Date(DateStyle::Short) => culture.short_date.to_string(),
            DataType::Date(DateStyle::Long) => {
                format!("[$-{}]{}", culture.lcid_hex(), culture.long_date)
            }
            DataType::Date(DateStyle::Iso) => "yyyy-mm-dd".to_string(),
            DataType::Time(TimeStyle::Short) => "h:mm".to_string(),
            DataType::Time(TimeStyle::Long) => culture.long_time.to_string(),
            DataType::Time(TimeStyle::Duration) => "[h]:mm:ss".to_string(),
            DataType::DateTime => format!("{} {}", culture.short_date, culture.long_time),
            DataType::Custom(code) => code.clone(),
        };
        Ok(code)
    }
}

/// Parses the compact form used on the command line: `kind[:n]`, e.g.
/// `number:2`, `currency:0`, `percent:1`, `date-long`, `custom=0.0"kg"`.
impl FromStr for DataType {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(code) = s.strip_prefix("custom=") {
            return Ok(DataType::Custom(code.to_string()));
        }
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };
        let count = |default: u8| -> Result<u8> {
            match arg {
                Some(a) => a.trim().parse().map_err(|_| {
                    DesignError::InvalidDesign(format!("invalid number in data type {:?}", s))
                }),
                None => Ok(default),
            }
        };
        let data_type = match kind.to_ascii_lowercase().as_str() {
            "general" => DataType::General,
            "text" => DataType::Text,
            "number" => DataType::number(count(2)?),
            "integer" => DataType::number(0),
            "currency" => DataType::currency(count(2)?),
            "accounting" => DataType::Accounting(CurrencyDesign {
                decimals: count(2)?,
                ..Default::default()
            }),
            "percent" => DataType::percent(count(0)?),
            "scientific" => DataType::Scientific {
                decimals: count(2)?,
            },
            "fraction" => DataType::Fraction { digits: count(1)? },
            "date" => DataType::Date(DateStyle::Short),
            "date-long" => DataType::Date(DateStyle::Long),
            "date-iso" => DataType::Date(DateStyle::Iso),
            "time" => DataType::Time(TimeStyle::Long),
            "time-short" => DataType::Time(TimeStyle::Short),
            "duration" => DataType::Time(TimeStyle::Duration),
            "datetime" => DataType::DateTime,
            other => {
                return Err(DesignError::InvalidDesign(format!(
                    "unknown data type: {}",
                    other
                )))
            }
        };
        data_type.validate()?;
        Ok(data_type)
    }
}

impl fmt::Display for NegativeNumberStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegativeNumberStyle::Minus => "minus",
            NegativeNumberStyle::RedMinus => "red-minus",
            NegativeNumberStyle::Red => "red",
            NegativeNumberStyle::Parentheses => "parentheses",
            NegativeNumberStyle::RedParentheses => "red-parentheses",
        };
        f.write_str(name)
    }
}
