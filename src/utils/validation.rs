use crate::utils::error::{RasterError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn check_http_url(url_str: &str) -> std::result::Result<(), String> {
    if url_str.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!("Unsupported URL scheme: {}", scheme)),
        },
        Err(e) => Err(format!("Invalid URL format: {}", e)),
    }
}

/// 設定檔中的 URL
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    check_http_url(url_str).map_err(|reason| RasterError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason,
    })
}

/// 請求參數中的 URL，錯誤屬於 InvalidArgument
pub fn require_http_url(url_str: &str) -> Result<&str> {
    let trimmed = url_str.trim();
    check_http_url(trimmed).map_err(RasterError::invalid_argument)?;
    Ok(trimmed)
}

/// 回傳去除空白後的國家代碼
pub fn require_country_code(country_code: &str) -> Result<&str> {
    let trimmed = country_code.trim();
    if trimmed.is_empty() {
        return Err(RasterError::invalid_argument("country code must be provided"));
    }
    Ok(trimmed)
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RasterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RasterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
