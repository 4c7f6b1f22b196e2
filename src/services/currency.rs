use crate::models::service::Amount;

/// Formats rupiah the way the storefront shows them: `Rp350.000`.
/// No fraction digits; halves round away from zero.
pub fn format_idr(amount: Amount) -> String {
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = (rounded.abs() as u64).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}Rp{}", sign, grouped)
}
