//! Free-form roll diameter lists

/// Result of parsing a diameter list: numbers in input order plus the
/// tokens that were not numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiameterList {
    pub values: Vec<f64>,
    pub rejected: Vec<String>,
}

/// Split on commas and whitespace (any mix, any run length) and parse each
/// token. Invalid tokens are collected rather than failing the whole list.
/// `nan` and `inf` parse as numbers and yield 0 labels downstream.
pub fn parse_diameters(raw: &str) -> DiameterList {
    let mut list = DiameterList::default();
    for token in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<f64>() {
            Ok(v) => list.values.push(v),
            Err(_) => list.rejected.push(token.to_string()),
        }
    }
    list
}
