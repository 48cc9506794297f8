//! Culture table used when synthesising number-format codes.
//!
//! Excel stores format codes with invariant separators (`,` for thousands,
//! `.` for decimals) and localises them when displaying. What varies by
//! culture is the currency symbol and its placement, the order of date
//! parts and the locale id used to localise month and day names.

use crate::error::{DesignError, Result};

/// Where the currency symbol sits relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyPlacement {
    /// `$1.00`
    Prefix,
    /// `€ 1.00`
    PrefixSpace,
    /// `1.00€`
    Suffix,
    /// `1.00 €`
    SuffixSpace,
}

impl CurrencyPlacement {
    pub fn is_prefix(self) -> bool {
        matches!(self, CurrencyPlacement::Prefix | CurrencyPlacement::PrefixSpace)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Culture {
    pub name: &'static str,
    /// Windows locale id, written in hex inside `[$-...]` format tokens.
    pub lcid: u32,
    pub currency_symbol: &'static str,
    pub currency_placement: CurrencyPlacement,
    pub short_date: &'static str,
    pub long_date: &'static str,
    pub long_time: &'static str,
}

impl Culture {
    /// Locale id as Excel writes it in format codes (`407`, `C0A`).
    pub fn lcid_hex(&self) -> String {
        format!("{:X}", self.lcid)
    }
}

pub static CULTURES: &[Culture] = &[
    Culture {
        name: "en-US",
        lcid: 0x409,
        currency_symbol: "$",
        currency_placement: CurrencyPlacement::Prefix,
        short_date: "m/d/yyyy",
        long_date: "dddd, mmmm d, yyyy",
        long_time: "h:mm:ss AM/PM",
    },
    Culture {
        name: "en-GB",
        lcid: 0x809,
        currency_symbol: "£",
        currency_placement: CurrencyPlacement::Prefix,
        short_date: "dd/mm/yyyy",
        long_date: "dd mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "de-DE",
        lcid: 0x407,
        currency_symbol: "€",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "dd.mm.yyyy",
        long_date: "dddd, d. mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "de-CH",
        lcid: 0x807,
        currency_symbol: "CHF",
        currency_placement: CurrencyPlacement::PrefixSpace,
        short_date: "dd.mm.yyyy",
        long_date: "dddd, d. mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "fr-FR",
        lcid: 0x40C,
        currency_symbol: "€",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "dd/mm/yyyy",
        long_date: "dddd d mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "es-ES",
        lcid: 0xC0A,
        currency_symbol: "€",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "dd/mm/yyyy",
        long_date: "dddd, d \"de\" mmmm \"de\" yyyy",
        long_time: "h:mm:ss",
    },
    Culture {
        name: "it-IT",
        lcid: 0x410,
        currency_symbol: "€",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "dd/mm/yyyy",
        long_date: "dddd d mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "nl-NL",
        lcid: 0x413,
        currency_symbol: "€",
        currency_placement: CurrencyPlacement::PrefixSpace,
        short_date: "d-m-yyyy",
        long_date: "dddd d mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "pt-BR",
        lcid: 0x416,
        currency_symbol: "R$",
        currency_placement: CurrencyPlacement::PrefixSpace,
        short_date: "dd/mm/yyyy",
        long_date: "dddd, d \"de\" mmmm \"de\" yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "sv-SE",
        lcid: 0x41D,
        currency_symbol: "kr",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "yyyy-mm-dd",
        long_date: "\"den \"d mmmm yyyy",
        long_time: "hh:mm:ss",
    },
    Culture {
        name: "ru-RU",
        lcid: 0x419,
        currency_symbol: "₽",
        currency_placement: CurrencyPlacement::SuffixSpace,
        short_date: "dd.mm.yyyy",
        long_date: "d mmmm yyyy \"г.\"",
        long_time: "h:mm:ss",
    },
    Culture {
        name: "ja-JP",
        lcid: 0x411,
        currency_symbol: "¥",
        currency_placement: CurrencyPlacement::Prefix,
        short_date: "yyyy/mm/dd",
        long_date: "yyyy\"年\"m\"月\"d\"日\"",
        long_time: "h:mm:ss",
    },
    Culture {
        name: "zh-CN",
        lcid: 0x804,
        currency_symbol: "¥",
        currency_placement: CurrencyPlacement::Prefix,
        short_date: "yyyy/m/d",
        long_date: "yyyy\"年\"m\"月\"d\"日\"",
        long_time: "h:mm:ss",
    },
];

/// Looks up a culture by name, ignoring case and accepting `_` for `-`.
pub fn find_culture(name: &str) -> Result<&'static Culture> {
    let wanted = name.trim().replace('_', "-");
    CULTURES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| DesignError::UnknownCulture(name.to_string()))
}

pub fn culture_names() -> Vec<String> {
    CULTURES.iter().map(|c| c.name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_culture() -> Result<()> {
        assert_eq!(find_culture("de-DE")?.currency_symbol, "€");
        assert_eq!(find_culture("EN_gb")?.name, "en-GB");
        assert_eq!(
            find_culture("tlh-KX").unwrap_err(),
            DesignError::UnknownCulture("tlh-KX".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_lcid_hex() -> Result<()> {
        assert_eq!(find_culture("en-US")?.lcid_hex(), "409");
        assert_eq!(find_culture("es-ES")?.lcid_hex(), "C0A");
        assert_eq!(find_culture("fr-FR")?.lcid_hex(), "40C");
        Ok(())
    }

    #[test]
    fn test_culture_names_are_unique() {
        let mut names = culture_names();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
