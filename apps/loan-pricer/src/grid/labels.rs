//! Grid axes and their display labels.

use serde::Serialize;

use super::GridError;

/// Parse a loan-to-value label such as `"70%"` into a fraction.
///
/// The percent sign is optional; the value must be positive.
pub fn parse_ltv_label(label: &str) -> Result<f64, GridError> {
    let trimmed = label.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();

    match number.parse::<f64>() {
        Ok(percent) if percent.is_finite() && percent > 0.0 => Ok(percent / 100.0),
        _ => Err(GridError::InvalidLtvLabel(label.to_string())),
    }
}

/// Parse a tenor label such as `"30d"` into a day count.
pub fn parse_tenor_label(label: &str) -> Result<u32, GridError> {
    let trimmed = label.trim();
    let number = trimmed.strip_suffix('d').unwrap_or(trimmed).trim_end();

    match number.parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(GridError::InvalidTenorLabel(label.to_string())),
    }
}

/// Loan-to-value rows and tenor columns, both ascending and deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSpec {
    ltvs: Vec<f64>,
    tenor_days: Vec<u32>,
}

impl GridSpec {
    /// Build a grid from raw axis values.
    pub fn new(mut ltvs: Vec<f64>, mut tenor_days: Vec<u32>) -> Result<Self, GridError> {
        if let Some(&bad) = ltvs.iter().find(|ltv| !(ltv.is_finite() && **ltv > 0.0)) {
            return Err(GridError::InvalidLtvLabel(bad.to_string()));
        }
        if tenor_days.contains(&0) {
            return Err(GridError::InvalidTenorLabel("0".to_string()));
        }

        ltvs.sort_by(f64::total_cmp);
        ltvs.dedup();
        tenor_days.sort_unstable();
        tenor_days.dedup();

        if ltvs.is_empty() {
            return Err(GridError::EmptyAxis("ltvs"));
        }
        if tenor_days.is_empty() {
            return Err(GridError::EmptyAxis("tenors"));
        }
        Ok(Self { ltvs, tenor_days })
    }

    /// Build a grid from `"70%"`-style and `"30d"`-style labels.
    pub fn from_labels<S: AsRef<str>>(ltvs: &[S], tenors: &[S]) -> Result<Self, GridError> {
        let ltvs = ltvs
            .iter()
            .map(|label| parse_ltv_label(label.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let tenor_days = tenors
            .iter()
            .map(|label| parse_tenor_label(label.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ltvs, tenor_days)
    }

    /// Loan-to-value fractions, ascending.
    #[must_use]
    pub fn ltvs(&self) -> &[f64] {
        &self.ltvs
    }

    /// Tenors in days, ascending.
    #[must_use]
    pub fn tenor_days(&self) -> &[u32] {
        &self.tenor_days
    }

    /// Cells in row-major order (LTV rows, tenor columns).
    pub fn cells(&self) -> impl Iterator<Item = (f64, u32)> + '_ {
        self.ltvs
            .iter()
            .flat_map(|&ltv| self.tenor_days.iter().map(move |&days| (ltv, days)))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("70%", 0.7 ; "percent")]
    #[test_case(" 85 % ", 0.85 ; "whitespace")]
    #[test_case("12.5%", 0.125 ; "fractional")]
    #[test_case("50", 0.5 ; "bare number")]
    fn test_parse_ltv_label(label: &str, expected: f64) {
        let ltv = parse_ltv_label(label).unwrap();
        assert!((ltv - expected).abs() < 1e-12);
    }

    #[test_case("" ; "empty")]
    #[test_case("abc%" ; "not a number")]
    #[test_case("0%" ; "zero")]
    #[test_case("-10%" ; "negative")]
    #[test_case("inf%" ; "infinite")]
    fn test_parse_ltv_label_rejects(label: &str) {
        assert_eq!(
            parse_ltv_label(label),
            Err(GridError::InvalidLtvLabel(label.to_string()))
        );
    }

    #[test_case("30d", 30 ; "days")]
    #[test_case("365", 365 ; "bare number")]
    #[test_case(" 7 d", 7 ; "whitespace")]
    fn test_parse_tenor_label(label: &str, expected: u32) {
        assert_eq!(parse_tenor_label(label), Ok(expected));
    }

    #[test_case("0d" ; "zero")]
    #[test_case("1.5d" ; "fractional")]
    #[test_case("30m" ; "wrong unit")]
    fn test_parse_tenor_label_rejects(label: &str) {
        assert!(parse_tenor_label(label).is_err());
    }

    #[test]
    fn test_labels_sorted_ascending() {
        let spec = GridSpec::from_labels(&["90%", "50%", "70%", "50%"], &["90d", "30d", "60d"])
            .unwrap();

        assert_eq!(spec.ltvs(), &[0.5, 0.7, 0.9]);
        assert_eq!(spec.tenor_days(), &[30, 60, 90]);
        assert_eq!(spec.cells().count(), 9);
    }

    #[test]
    fn test_cells_row_major() {
        let spec = GridSpec::new(vec![0.5, 0.7], vec![30, 60]).unwrap();
        let cells: Vec<_> = spec.cells().collect();
        assert_eq!(cells, vec![(0.5, 30), (0.5, 60), (0.7, 30), (0.7, 60)]);
    }

    #[test]
    fn test_empty_axis_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(
            GridSpec::from_labels(&empty, &["30d"]),
            Err(GridError::EmptyAxis("ltvs"))
        );
        assert_eq!(
            GridSpec::new(vec![0.5], Vec::new()),
            Err(GridError::EmptyAxis("tenors"))
        );
    }
}
