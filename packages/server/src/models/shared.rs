use crate::error::AppError;

const MAX_USERNAME_LEN: usize = 50;

/// Validate a Chess.com username (1-50 of `[A-Za-z0-9_-]`) and return it
/// lower-cased.
pub fn validate_username(username: &str) -> Result<String, AppError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::BadRequest(format!(
            "Invalid username '{username}': use 1-{MAX_USERNAME_LEN} letters, digits, '_' or '-'"
        )));
    }
    Ok(username.to_ascii_lowercase())
}

/// Parse a boolean query flag. Accepts `true/t/yes/y/1` and `false/f/no/n/0`
/// in any case.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(AppError::BadRequest(format!(
            "Invalid value '{value}' for {name}: expected a boolean"
        ))),
    }
}

pub fn parse_positive(name: &str, value: &str) -> Result<usize, AppError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!(
            "Invalid value '{value}' for {name}: expected a positive integer"
        ))),
    }
}

pub fn parse_year(value: &str) -> Result<i32, AppError> {
    match value.trim().parse::<i32>() {
        Ok(y) if (1..=9999).contains(&y) => Ok(y),
        _ => Err(AppError::BadRequest(format!(
            "Invalid year '{value}': expected 1-9999"
        ))),
    }
}

pub fn parse_month(value: &str) -> Result<u32, AppError> {
    match value.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(AppError::BadRequest(format!(
            "Invalid month '{value}': expected 1-12"
        ))),
    }
}

/// Parse an archive selector of the form `YYYY/MM`.
pub fn parse_archive(value: &str) -> Result<(i32, u32), AppError> {
    let invalid = || {
        AppError::BadRequest(format!(
            "Invalid archive '{value}': expected YYYY/MM"
        ))
    };
    let (year, month) = value.trim().split_once('/').ok_or_else(invalid)?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return Err(invalid());
    }
    let year = parse_year(year).map_err(|_| invalid())?;
    let month = parse_month(month).map_err(|_| invalid())?;
    Ok((year, month))
}

/// Treat an empty query value (`?limit=`) the same as an absent one.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
