//! CSV rendering and parsing for the lead export/import endpoints.
//!
//! RFC 4180 shapes only: comma-separated, `"` quoting with `""` escapes,
//! quoted fields may span lines. Rendering and parsing share the fixed
//! export column set.

use pipecrm_leads::{Lead, NewLead};

pub const EXPORT_COLUMNS: [&str; 10] = [
    "first_name",
    "last_name",
    "email",
    "company",
    "phone",
    "source",
    "status",
    "notes",
    "owner_email",
    "created",
];

/// Render leads as a CSV document with the fixed export header.
pub fn render_leads(leads: &[Lead]) -> String {
    let mut out = String::new();
    write_row(&mut out, EXPORT_COLUMNS.iter().copied());

    for lead in leads {
        let created = lead.created.to_rfc3339();
        write_row(
            &mut out,
            [
                lead.first_name.as_str(),
                lead.last_name.as_str(),
                lead.email.as_deref().unwrap_or(""),
                lead.company.as_deref().unwrap_or(""),
                lead.phone.as_deref().unwrap_or(""),
                lead.source.as_deref().unwrap_or(""),
                lead.status.as_deref().unwrap_or(""),
                lead.notes.as_deref().unwrap_or(""),
                lead.owner_email.as_str(),
                created.as_str(),
            ]
            .into_iter(),
        );
    }

    out
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains(['"', ',', '\n', '\r']) {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Parse an import document into lead payloads.
///
/// The first record is the header; columns are matched by name and columns
/// this system does not know are ignored. Rows missing a name column get an
/// empty string (imports from other systems are often partial). `owner_email`
/// and `created` columns in the file are ignored: the owner is the importer
/// and the timestamp is assigned at insert.
pub fn parse_leads(text: &str) -> Vec<NewLead> {
    let mut records = parse_records(text).into_iter();
    let Some(header) = records.next() else {
        return Vec::new();
    };

    let col = |name: &str| header.iter().position(|h| h.trim() == name);
    let first_name = col("first_name");
    let last_name = col("last_name");
    let email = col("email");
    let company = col("company");
    let phone = col("phone");
    let source = col("source");
    let status = col("status");
    let notes = col("notes");

    let required = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
    };
    let optional = |row: &[String], idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| row.get(i))
            .filter(|v| !v.is_empty())
            .cloned()
    };

    records
        .filter(|row| row.iter().any(|f| !f.is_empty()))
        .map(|row| NewLead {
            first_name: required(&row, first_name),
            last_name: required(&row, last_name),
            email: optional(&row, email),
            company: optional(&row, company),
            phone: optional(&row, phone),
            source: optional(&row, source),
            status: optional(&row, status),
            notes: optional(&row, notes),
        })
        .collect()
}

/// Split a document into records of fields, honoring quoting.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    // Final record without a trailing newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}
