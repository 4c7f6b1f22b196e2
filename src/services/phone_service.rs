//! Splitting stored phone numbers into a dialing code and local digits, and
//! joining them back for booking payloads.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryCode {
    pub code: &'static str,
    pub label: &'static str,
    pub iso: &'static str,
}

const fn entry(code: &'static str, label: &'static str, iso: &'static str) -> CountryCode {
    CountryCode { code, label, iso }
}

/// Dialing codes offered by the phone picker. The first entry is the
/// domestic default.
pub const COUNTRY_CODES: &[CountryCode] = &[
    entry("+62", "Indonesia (+62)", "ID"),
    entry("+60", "Malaysia (+60)", "MY"),
    entry("+65", "Singapore (+65)", "SG"),
    entry("+61", "Australia (+61)", "AU"),
    entry("+44", "United Kingdom (+44)", "GB"),
    entry("+1", "USA (+1)", "US"),
    entry("+81", "Japan (+81)", "JP"),
    entry("+82", "South Korea (+82)", "KR"),
    entry("+86", "China (+86)", "CN"),
    entry("+971", "UAE (+971)", "AE"),
    entry("+33", "France (+33)", "FR"),
    entry("+49", "Germany (+49)", "DE"),
    entry("+91", "India (+91)", "IN"),
    entry("+31", "Netherlands (+31)", "NL"),
    entry("+64", "New Zealand (+64)", "NZ"),
    entry("+63", "Philippines (+63)", "PH"),
    entry("+66", "Thailand (+66)", "TH"),
    entry("+90", "Turkey (+90)", "TR"),
    entry("+84", "Vietnam (+84)", "VN"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneParts {
    pub code: String,
    pub local: String,
}

pub fn default_code(table: &[CountryCode]) -> &'static str {
    table.first().map_or("", |entry| entry.code)
}

/// Splits `stored` by the longest dialing code in `table` that prefixes it.
///
/// Without a match the default code is used and one leading domestic trunk
/// `0` or copy of the default code (with or without `+`) is dropped.
pub fn parse(stored: &str, table: &[CountryCode]) -> PhoneParts {
    let stored = stored.trim();

    let mut candidates: Vec<&CountryCode> = table.iter().collect();
    candidates.sort_by(|a, b| b.code.len().cmp(&a.code.len()));

    if let Some(matched) = candidates.iter().find(|c| stored.starts_with(c.code)) {
        return PhoneParts {
            code: matched.code.to_string(),
            local: stored[matched.code.len()..].to_string(),
        };
    }

    let code = default_code(table);
    PhoneParts {
        code: code.to_string(),
        local: strip_domestic_prefix(stored, code),
    }
}

fn strip_domestic_prefix(stored: &str, code: &str) -> String {
    let bare = code.trim_start_matches('+');
    let pattern = if bare.is_empty() {
        "^0".to_string()
    } else {
        format!(r"^(?:{}|{}|0)", regex::escape(code), regex::escape(bare))
    };

    match Regex::new(&pattern) {
        Ok(re) => re.replace(stored, "").into_owned(),
        Err(_) => stored.to_string(),
    }
}

/// `code` followed by the digits of `local`; everything else is dropped.
pub fn compose(code: &str, local: &str) -> String {
    let digits: String = local.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{}{}", code, digits)
}

pub fn digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}
