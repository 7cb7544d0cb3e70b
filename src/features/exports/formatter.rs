//! Turns a record set into a downloadable CSV table.
//!
//! Known categories have fixed columns; anything else uses the first
//! record's own keys in order.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// One exported record, keys in their original order
pub type Record = Map<String, Value>;

/// Byte order mark so spreadsheet tools detect UTF-8
pub const UTF8_BOM: &str = "\u{feff}";

const STATUS_EKONOMI_COLUMNS: &[(&str, &str)] = &[
    ("No KK", "no_kk"),
    ("Kepala Keluarga", "nama_kepala_keluarga"),
    ("Status Ekonomi", "status_ekonomi"),
    ("Penghasilan Bulanan", "penghasilan_bulanan"),
    ("Jumlah Anggota", "jumlah_anggota"),
    ("Status Verifikasi", "status_verifikasi"),
];

const WILAYAH_COLUMNS: &[(&str, &str)] = &[
    ("No KK", "no_kk"),
    ("Kepala Keluarga", "nama_kepala_keluarga"),
    ("Alamat", "alamat"),
    ("RT", "rt"),
    ("RW", "rw"),
    ("Kelurahan", "kelurahan"),
    ("Kecamatan", "kecamatan"),
    ("Kota", "kota"),
    ("Provinsi", "provinsi"),
    ("Kode Pos", "kode_pos"),
];

const KOORDINAT_COLUMNS: &[(&str, &str)] = &[
    ("No KK", "no_kk"),
    ("Kepala Keluarga", "nama_kepala_keluarga"),
    ("Kota", "kota"),
    ("Latitude", "latitude"),
    ("Longitude", "longitude"),
];

/// Report category selected by the URL tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportCategory {
    StatusEkonomi,
    Wilayah,
    Koordinat,
    /// Any other tag, exported with the records' own keys
    Other(String),
}

impl ExportCategory {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "status-ekonomi" => ExportCategory::StatusEkonomi,
            "wilayah" => ExportCategory::Wilayah,
            "koordinat" => ExportCategory::Koordinat,
            other => ExportCategory::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ExportCategory::StatusEkonomi => "status-ekonomi",
            ExportCategory::Wilayah => "wilayah",
            ExportCategory::Koordinat => "koordinat",
            ExportCategory::Other(tag) => tag,
        }
    }

    /// Header label and record key for each column of a fixed layout
    fn columns(&self) -> Option<&'static [(&'static str, &'static str)]> {
        match self {
            ExportCategory::StatusEkonomi => Some(STATUS_EKONOMI_COLUMNS),
            ExportCategory::Wilayah => Some(WILAYAH_COLUMNS),
            ExportCategory::Koordinat => Some(KOORDINAT_COLUMNS),
            ExportCategory::Other(_) => None,
        }
    }
}

/// Formatted export ready to serialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub filename: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// CSV body: BOM, header line, then one line per row, all CRLF-terminated
    pub fn to_csv(&self) -> String {
        let mut out = String::from(UTF8_BOM);

        if !self.headers.is_empty() {
            push_line(&mut out, &self.headers);
        }
        for row in &self.rows {
            push_line(&mut out, row);
        }

        out
    }
}

/// `laporan-{tag}-{YYYY-MM-DDTHH-MM-SS}.csv`; characters outside `[A-Za-z0-9_-]` in the tag become `-`
pub fn export_filename(category: &ExportCategory, now: DateTime<Utc>) -> String {
    let tag: String = category
        .tag()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    format!("laporan-{}-{}.csv", tag, now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Build the export table for `category` from `records`
pub fn format_records(
    records: &[Record],
    category: &ExportCategory,
    now: DateTime<Utc>,
) -> ExportTable {
    let filename = export_filename(category, now);

    let (headers, keys): (Vec<String>, Vec<String>) = match category.columns() {
        Some(columns) => columns
            .iter()
            .map(|(label, key)| (label.to_string(), key.to_string()))
            .unzip(),
        None => {
            let keys: Vec<String> = records
                .first()
                .map(|first| first.keys().cloned().collect())
                .unwrap_or_default();
            (keys.clone(), keys)
        }
    };

    let rows = records
        .iter()
        .map(|record| {
            keys.iter()
                .map(|key| cell_text(record.get(key)))
                .collect()
        })
        .collect();

    ExportTable {
        filename,
        headers,
        rows,
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn push_line(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 9).unwrap()
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    /// Minimal RFC 4180 reader for checking the writer's output
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let body = input.strip_prefix(UTF8_BOM).unwrap_or(input);
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut chars = body.chars().peekable();
        let mut quoted = false;

        while let Some(c) = chars.next() {
            if quoted {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        field.push('"');
                        chars.next();
                    }
                    '"' => quoted = false,
                    _ => field.push(c),
                }
                continue;
            }
            match c {
                '"' => quoted = true,
                ',' => row.push(std::mem::take(&mut field)),
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                _ => field.push(c),
            }
        }

        rows
    }

    #[test]
    fn test_filename_uses_utc_timestamp() {
        assert_eq!(
            export_filename(&ExportCategory::Wilayah, now()),
            "laporan-wilayah-2025-06-01T14-05-09.csv"
        );
        assert_eq!(
            export_filename(&ExportCategory::from_tag("rekap/2025 \"x\""), now()),
            "laporan-rekap-2025--x--2025-06-01T14-05-09.csv"
        );
    }

    #[test]
    fn test_status_ekonomi_fixed_columns_blank_missing() {
        let records = vec![record(json!({
            "no_kk": "3201010101010001",
            "nama_kepala_keluarga": "Budi",
            "status_ekonomi": "miskin",
            "penghasilan_bulanan": "1500000.00",
            "jumlah_anggota": 4,
            "status_verifikasi": null,
            "alamat": "ignored"
        }))];

        let table = format_records(&records, &ExportCategory::StatusEkonomi, now());

        assert_eq!(
            table.headers,
            vec![
                "No KK",
                "Kepala Keluarga",
                "Status Ekonomi",
                "Penghasilan Bulanan",
                "Jumlah Anggota",
                "Status Verifikasi"
            ]
        );
        assert_eq!(
            table.rows,
            vec![vec!["3201010101010001", "Budi", "miskin", "1500000.00", "4", ""]]
        );
    }

    #[test]
    fn test_koordinat_and_wilayah_column_counts() {
        let records = vec![record(json!({"no_kk": "1", "latitude": -6.2, "longitude": 106.8}))];

        let koordinat = format_records(&records, &ExportCategory::Koordinat, now());
        assert_eq!(koordinat.headers.len(), 5);
        assert_eq!(koordinat.rows[0], vec!["1", "", "", "-6.2", "106.8"]);

        let wilayah = format_records(&records, &ExportCategory::Wilayah, now());
        assert_eq!(wilayah.headers.len(), 10);
        assert_eq!(wilayah.headers[9], "Kode Pos");
    }

    #[test]
    fn test_default_category_uses_first_record_keys_in_order() {
        let records = vec![
            record(json!({"zeta": 1, "alpha": "a", "mid": true})),
            record(json!({"alpha": "b", "extra": "dropped"})),
        ];

        let table = format_records(&records, &ExportCategory::from_tag("custom"), now());

        assert_eq!(table.headers, vec!["zeta", "alpha", "mid"]);
        assert_eq!(table.rows[0], vec!["1", "a", "true"]);
        assert_eq!(table.rows[1], vec!["", "b", ""]);
    }

    #[test]
    fn test_default_category_empty_records() {
        let table = format_records(&[], &ExportCategory::from_tag("custom"), now());
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.to_csv(), UTF8_BOM);
    }

    #[test]
    fn test_csv_quotes_special_values_and_uses_crlf() {
        let table = ExportTable {
            filename: "x.csv".to_string(),
            headers: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec!["Jl. Mawar, No. 5".to_string(), "plain".to_string()]],
        };

        assert_eq!(
            table.to_csv(),
            "\u{feff}a,b\r\n\"Jl. Mawar, No. 5\",plain\r\n"
        );
    }

    #[test]
    fn test_csv_parses_back_to_original_strings() {
        let values = vec![
            "comma, inside".to_string(),
            "say \"halo\"".to_string(),
            "line\nbreak".to_string(),
            "carriage\r\nreturn".to_string(),
            "Désa Sukamaju".to_string(),
            String::new(),
        ];
        let table = ExportTable {
            filename: "x.csv".to_string(),
            headers: (0..values.len()).map(|i| format!("c{}", i)).collect(),
            rows: vec![values.clone()],
        };

        let parsed = parse_csv(&table.to_csv());

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], table.headers);
        assert_eq!(parsed[1], values);
    }
}
