use sonarpipe_core::config::MAX_ISSUES_PAGE_SIZE;

pub(super) fn parse_min_one_u32(raw: &str) -> std::result::Result<u32, String> {
    let value = raw
        .parse::<u32>()
        .map_err(|_| format!("invalid integer value '{raw}'"))?;
    if value == 0 {
        return Err("value must be >= 1".to_string());
    }
    Ok(value)
}

pub(super) fn parse_page_size(raw: &str) -> std::result::Result<u32, String> {
    let value = parse_min_one_u32(raw)?;
    if value > MAX_ISSUES_PAGE_SIZE {
        return Err(format!(
            "value must be within [1, {MAX_ISSUES_PAGE_SIZE}], got {value}"
        ));
    }
    Ok(value)
}

pub(super) fn parse_host(raw: &str) -> std::result::Result<String, String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!("host must start with http:// or https://, got '{raw}'"));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
