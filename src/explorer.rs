use url::form_urlencoded;

/// Lower-cased `0x` + 64 hex digits, the receipt store's primary key format.
pub fn normalize_tx_hash(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let hex_part = trimmed.strip_prefix("0x")?;
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed.to_lowercase())
}

pub fn build_explorer_tx_url(explorer_base: &str, tx: &str) -> String {
    format!("{}/tx/{}", explorer_base.trim_end_matches('/'), tx)
}

pub fn build_qr_url(target: &str, size: u32, margin: u32) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("text", target)
        .append_pair("size", &size.to_string())
        .append_pair("margin", &margin.to_string())
        .finish();
    format!("https://quickchart.io/qr?{}", query)
}
