/// Splits batch input on newlines and commas; runs of either collapse and
/// blank pieces are dropped.
pub fn split_candidates(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
