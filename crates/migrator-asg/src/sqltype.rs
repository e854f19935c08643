//! §6 and §6.1's fixed type tables: SQL type code → readable name → Talend
//! `id_<Type>` token. Both tables are total; an unmapped code or name falls
//! back to a readable string and `id_String` respectively, matching the
//! original's `.get(..., "id_String")` fallback.

/// SQL type code → readable name (§6, authoritative, partial table).
pub fn readable_name(code: i64) -> &'static str {
    match code {
        1 => "CHAR",
        3 => "DECIMAL",
        4 => "INTEGER",
        5 => "SMALLINT",
        6 => "FLOAT",
        7 => "REAL",
        8 => "DOUBLE",
        9 => "DATE",
        10 => "TIME",
        11 => "TIMESTAMP",
        12 => "VARCHAR",
        -1 => "LONGVARCHAR",
        -5 => "BIGINT",
        -6 => "TINYINT",
        -7 => "BIT",
        -8 => "NCHAR",
        -9 => "NVARCHAR",
        _ => "VARCHAR",
    }
}

/// Readable name → Talend `id_<Type>` token (§6.1, added from
/// `original_source`). Falls back to `id_String` for anything unrecognized.
pub fn talend_type_token(readable: &str) -> &'static str {
    match readable {
        "CHAR" | "VARCHAR" | "NCHAR" | "NVARCHAR" | "LONGVARCHAR" | "STRING" => "id_String",
        "INTEGER" | "SMALLINT" | "TINYINT" => "id_Integer",
        "BIGINT" => "id_Long",
        "DOUBLE" => "id_Double",
        "FLOAT" | "REAL" => "id_Float",
        "DECIMAL" => "id_BigDecimal",
        "DATE" | "TIME" | "TIMESTAMP" => "id_Date",
        "BIT" => "id_Boolean",
        _ => "id_String",
    }
}

/// Compose both tables: the Talend type token for a raw `SqlType` code.
pub fn talend_type_for_code(code: i64) -> String {
    talend_type_token(readable_name(code)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_codes() {
        assert_eq!(talend_type_for_code(4), "id_Integer");
        assert_eq!(talend_type_for_code(9), "id_Date");
        assert_eq!(talend_type_for_code(-7), "id_Boolean");
    }

    #[test]
    fn unknown_code_falls_back_to_id_string() {
        assert_eq!(talend_type_for_code(9999), "id_String");
    }
}
