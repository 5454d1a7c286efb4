//! Input checks shared by the request handlers.
//!
//! Each check returns `AppError::ValidationError` carrying the message shown
//! to the client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::utils::error::{AppError, AppResult};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;
/// Upper bound on a ticket price, in cents of the payment currency.
pub const MAX_TICKET_PRICE_CENTS: i64 = 10_000_000;

fn invalid(message: impl Into<String>) -> AppError {
    AppError::ValidationError(message.into())
}

/// Trims `value` and rejects it when nothing is left.
pub fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub fn name(value: &str) -> AppResult<String> {
    let name = required(value, "Name")?;
    if name.chars().count() < MIN_NAME_LEN {
        return Err(invalid(format!(
            "Name must be at least {MIN_NAME_LEN} characters long"
        )));
    }
    Ok(name)
}

/// Normalizes an email address to lowercase after a structural check.
pub fn email(value: &str) -> AppResult<String> {
    let email = required(value, "Email")?.to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(email)
}

pub fn new_password(password: &str, confirmation: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if password != confirmation {
        return Err(invalid("Passwords do not match"));
    }
    Ok(())
}

pub fn ticket_count(tickets: i32, max: i32) -> AppResult<()> {
    if tickets < 1 || tickets > max {
        return Err(invalid(format!("You can book 1-{max} tickets maximum")));
    }
    Ok(())
}

pub fn future_date(date: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if date <= now {
        return Err(invalid("Event date must be in the future"));
    }
    Ok(())
}

pub fn price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() || price.normalize().scale() > 2 {
        return Err(invalid("Valid price is required"));
    }
    let max = Decimal::new(MAX_TICKET_PRICE_CENTS, 2);
    if price > max {
        return Err(invalid(format!("Price cannot exceed {max}")));
    }
    Ok(())
}

pub fn total_tickets(total: i32) -> AppResult<()> {
    if total < 1 {
        return Err(invalid("Valid number of tickets is required"));
    }
    Ok(())
}

/// Drops blank entries and rejects anything that is not an absolute http(s) URL.
pub fn image_urls(urls: &[String]) -> AppResult<Vec<String>> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(|url| {
            let rest = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"));
            match rest {
                Some(host_and_path)
                    if !host_and_path.is_empty()
                        && !host_and_path.starts_with('/')
                        && !url.chars().any(char::is_whitespace) =>
                {
                    Ok(url.to_string())
                }
                _ => Err(invalid(format!("Invalid image URL: {url}"))),
            }
        })
        .collect()
}
