use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::query::Query;
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};

/// A single SQLite cell, read by its runtime storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Read column `index` of `row` without coercing to the declared type.
    pub fn read(row: &SqliteRow, index: usize) -> Result<Self, sqlx::Error> {
        let storage_class = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                return Ok(CellValue::Null);
            }
            raw.type_info().name().to_string()
        };

        Ok(match storage_class.as_str() {
            "INTEGER" => CellValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
            "REAL" => CellValue::Real(row.try_get_unchecked::<f64, _>(index)?),
            "TEXT" => CellValue::Text(safe_decode(&row.try_get_unchecked::<Vec<u8>, _>(index)?)),
            _ => CellValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        })
    }

    pub(crate) fn bind<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            CellValue::Null => query.bind(None::<i64>),
            CellValue::Integer(value) => query.bind(value),
            CellValue::Real(value) => query.bind(value),
            CellValue::Text(value) => query.bind(value),
            CellValue::Blob(value) => query.bind(value),
        }
    }
}

/// Decode stored text as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a code point, so the fallback never fails.
pub fn safe_decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|byte| char::from(*byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_text() {
        assert_eq!(safe_decode("São Paulo".as_bytes()), "São Paulo");
    }

    #[test]
    fn falls_back_to_latin1() {
        assert_eq!(safe_decode(&[0x53, 0xe3, 0x6f]), "São");
        assert_eq!(safe_decode(&[0xff]), "ÿ");
    }
}
