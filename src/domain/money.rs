use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For BRL, 1 real = 100 centavos, so R$ 500,00 = 50000 cents.
pub type Cents = i64;

/// Format cents for display using the Brazilian convention: thousands
/// separator `.`, decimal separator `,`, exactly two decimal places.
/// Example: 5000 -> "50,00", 123456789 -> "1.234.567,89"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let remainder = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}{},{:02}", sign, grouped, remainder)
}

/// Parse a money string into cents. This is the authoritative parser: any
/// masking a caller applies to its input fields is cosmetic, amounts always
/// go through here before touching an account.
///
/// Accepts plain and Brazilian-formatted input, with an optional `R$` prefix:
/// "500" -> 50000, "500.00" -> 50000, "500,00" -> 50000,
/// "1.234,56" -> 123456, "R$ 1.234" -> 123400
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let input = input
        .strip_prefix("R$")
        .or_else(|| input.strip_prefix("r$"))
        .unwrap_or(input)
        .trim();

    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');
    if input.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let (units_str, decimal_str) = split_units_and_decimals(input)?;

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?
    };

    // Pad or truncate the decimal part to 2 digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => {
            // Single digit like "5" means 50 cents
            decimal_str
                .parse::<i64>()
                .map_err(|_| ParseCentsError::InvalidFormat)?
                * 10
        }
        2 => decimal_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
        // A multibyte character at the cut point is a format error
        _ => decimal_str
            .get(..2)
            .ok_or(ParseCentsError::InvalidFormat)?
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::InvalidFormat)?;
    Ok(if negative { -cents } else { cents })
}

/// Split a sign-stripped amount into its units and decimal digits.
///
/// With a comma present, the comma is the decimal separator and any dots
/// before it are thousands separators. With only dots, groups of exactly
/// three digits after a leading group of at most three read as thousands
/// notation ("1.234" is one thousand two hundred and thirty-four reais),
/// anything else as a decimal point ("500.00", "1.5"). A leading bare
/// zero always reads as a decimal ("0.500" is fifty cents).
fn split_units_and_decimals(input: &str) -> Result<(String, &str), ParseCentsError> {
    if input.contains(',') {
        let parts: Vec<&str> = input.split(',').collect();
        if parts.len() != 2 {
            return Err(ParseCentsError::InvalidFormat);
        }
        let units = parts[0].replace('.', "");
        return Ok((units, parts[1]));
    }

    if input.contains('.') {
        let groups: Vec<&str> = input.split('.').collect();
        let thousands = groups[0] != "0"
            && !groups[0].is_empty()
            && groups[0].len() <= 3
            && groups[1..].iter().all(|g| g.len() == 3);
        if thousands {
            return Ok((groups.concat(), ""));
        }
        if groups.len() != 2 {
            return Err(ParseCentsError::InvalidFormat);
        }
        return Ok((groups[0].to_string(), groups[1]));
    }

    Ok((input.to_string(), ""))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
