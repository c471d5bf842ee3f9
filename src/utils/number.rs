use rust_decimal::Decimal;
use std::str::FromStr;

/// 價格表常見的幣別標記，解析前移除
const CURRENCY_TOKENS: &[&str] = &["EUR", "USD", "RNDR", "RENDER", "€", "$"];

/// Parse a human-formatted number such as `€1.234,56`, `1,234.56 EUR` or
/// `0,20` into a [`Decimal`].
///
/// A lone separator followed by exactly three digits with a non-zero integer
/// part of at most three digits is read as a thousands separator
/// (`1,234` → 1234, `0,200` → 0.2).
pub fn parse_locale_decimal(raw: &str) -> Option<Decimal> {
    let mut cleaned = raw.trim().to_string();
    for token in CURRENCY_TOKENS {
        cleaned = cleaned.replace(token, "");
    }

    let allowed = |c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, ',' | '.' | '-' | '+' | '\'' | '\u{2212}')
    };
    if !cleaned.chars().all(allowed) {
        return None;
    }

    let negative = cleaned.starts_with('-') || cleaned.starts_with('\u{2212}');
    let body: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = normalize_separators(&body)?;
    let mut value = Decimal::from_str(&normalized).ok()?;
    if negative {
        value.set_sign_negative(true);
    }
    Some(value)
}

fn normalize_separators(body: &str) -> Option<String> {
    let decimal_sep = match (body.rfind(','), body.rfind('.')) {
        (Some(comma), Some(dot)) => Some(if comma > dot { ',' } else { '.' }),
        (Some(_), None) => single_separator_role(body, ','),
        (None, Some(_)) => single_separator_role(body, '.'),
        (None, None) => None,
    };

    let (int_part, frac_part) = match decimal_sep.and_then(|sep| body.rsplit_once(sep)) {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body, None),
    };

    let digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    let int_digits = if digits.is_empty() { "0" } else { digits.as_str() };

    match frac_part {
        Some(frac) if frac.chars().all(|c| c.is_ascii_digit()) => {
            if frac.is_empty() {
                Some(int_digits.to_string())
            } else {
                Some(format!("{}.{}", int_digits, frac))
            }
        }
        Some(_) => None,
        None => Some(int_digits.to_string()),
    }
}

/// 只出現一種分隔符號時判斷它是小數點還是千分位
fn single_separator_role(body: &str, sep: char) -> Option<char> {
    if body.matches(sep).count() > 1 {
        return None;
    }

    let (int_part, frac_part) = body.split_once(sep)?;
    let looks_grouped = frac_part.len() == 3
        && !int_part.is_empty()
        && int_part.len() <= 3
        && int_part.trim_start_matches('0') == int_part;

    if looks_grouped {
        None
    } else {
        Some(sep)
    }
}

/// Render `value` rounded to `dp` places with `,` thousands separators.
pub fn format_grouped(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp(dp);
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
