//! Conversion between Excel-style cell names ("B3") and 1-based coordinates.
use crate::spreadsheet::SpreadsheetError;
use regex::Regex;
use std::sync::LazyLock;

/// Largest column addressable in a worksheet ("XFD").
pub const MAX_COLUMN: usize = 16_384;

/// Largest row addressable in a worksheet.
pub const MAX_ROW: usize = 1_048_576;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)$").expect("Hardcode regex pattern"));

/// Converts column letters to a 1-based column number: A = 1, Z = 26, AA = 27, ...
pub fn column_number(letters: &str) -> Result<usize, SpreadsheetError> {
    let invalid = || SpreadsheetError::InvalidColumn(letters.to_owned());
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    let column = letters
        .to_ascii_uppercase()
        .chars()
        .try_fold(0usize, |column, c| {
            column.checked_mul(26)?.checked_add(c as usize - 'A' as usize + 1)
        })
        .ok_or_else(invalid)?;
    if column > MAX_COLUMN {
        Err(invalid())
    } else {
        Ok(column)
    }
}

/// Converts a 1-based column number to its letters: 1 = A, 28 = AB.
pub fn column_name(column: usize) -> Result<String, SpreadsheetError> {
    if column == 0 || column > MAX_COLUMN {
        return Err(SpreadsheetError::InvalidColumn(column.to_string()));
    }
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        column -= 1;
        name.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    Ok(name)
}

/// Parses a cell name into `(column, row)`, both 1-based.
pub fn reference_to_coordinates(reference: &str) -> Result<(usize, usize), SpreadsheetError> {
    let invalid = || SpreadsheetError::InvalidReference(reference.to_owned());
    let captures = REFERENCE_PATTERN.captures(reference.trim()).ok_or_else(invalid)?;
    let column = column_number(&captures[1]).map_err(|_| invalid())?;
    let row = captures[2].parse::<usize>().map_err(|_| invalid())?;
    if row == 0 || row > MAX_ROW {
        Err(invalid())
    } else {
        Ok((column, row))
    }
}

/// Builds a cell name from 1-based `(column, row)` coordinates.
pub fn coordinates_to_reference(column: usize, row: usize) -> Result<String, SpreadsheetError> {
    if row == 0 || row > MAX_ROW {
        return Err(SpreadsheetError::InvalidReference(format!("R{row}C{column}")));
    }
    Ok(format!("{}{}", column_name(column)?, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_number("A").unwrap(), 1);
        assert_eq!(column_number("z").unwrap(), 26);
        assert_eq!(column_number("AA").unwrap(), 27);
        assert_eq!(column_number("XFD").unwrap(), MAX_COLUMN);
        assert!(column_number("XFE").is_err());
        assert!(column_number("").is_err());
        assert!(column_number("A1").is_err());

        assert_eq!(column_name(1).unwrap(), "A");
        assert_eq!(column_name(26).unwrap(), "Z");
        assert_eq!(column_name(28).unwrap(), "AB");
        assert_eq!(column_name(MAX_COLUMN).unwrap(), "XFD");
        assert!(column_name(0).is_err());
    }

    #[test]
    fn cell_names() {
        assert_eq!(reference_to_coordinates("A1").unwrap(), (1, 1));
        assert_eq!(reference_to_coordinates("$C$12").unwrap(), (3, 12));
        assert_eq!(reference_to_coordinates("ab3").unwrap(), (28, 3));
        assert!(reference_to_coordinates("A0").is_err());
        assert!(reference_to_coordinates("1A").is_err());
        assert!(reference_to_coordinates("").is_err());

        assert_eq!(coordinates_to_reference(2, 7).unwrap(), "B7");
        assert!(coordinates_to_reference(2, 0).is_err());
    }
}
