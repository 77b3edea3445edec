//! Exports: JSON backups and the printable group sheet

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::models::Document;
use crate::storage::EXPORTED_AT_KEY;

/// Suggested file name for JSON backups
pub const EXPORT_FILE_NAME: &str = "sortpot-data.json";

const APP_TITLE: &str = "SortPot";
const UNNAMED_CLASSROOM: &str = "Unnamed classroom";

/// Pretty JSON snapshot of the full document, stamped with `exported_at`
pub fn export_document(document: &Document, exported_at: DateTime<Utc>) -> Result<String> {
    let mut value = serde_json::to_value(document)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            EXPORTED_AT_KEY.to_string(),
            Value::String(exported_at.to_rfc3339()),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Standalone HTML page listing `groups`, meant for the host's print dialog
pub fn print_html(groups: &[Vec<String>], class_name: Option<&str>, date: NaiveDate) -> String {
    let class_name = escape_html(class_name.unwrap_or(UNNAMED_CLASSROOM));
    let date = date.format("%d/%m/%Y");

    let mut sections = String::new();
    for (index, group) in groups.iter().enumerate() {
        let members: Vec<String> = group.iter().map(|name| escape_html(name)).collect();
        sections.push_str(&format!(
            "    <div class=\"group\">\n      <h3>Group {}</h3>\n      <p>{}</p>\n    </div>\n",
            index + 1,
            members.join(", ")
        ));
    }

    format!(
        r#"<html>
  <head>
    <title>{title} - {class_name}</title>
    <style>
      body {{ font-family: Arial, sans-serif; padding: 24px; }}
      h1 {{ margin-top: 0; }}
      .group {{ margin-bottom: 16px; }}
      .group h3 {{ margin-bottom: 6px; }}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
    <p><strong>Class:</strong> {class_name}</p>
    <p><strong>Date:</strong> {date}</p>
{sections}  </body>
</html>
"#,
        title = APP_TITLE,
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_import;
    use chrono::TimeZone;

    #[test]
    fn test_export_carries_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let raw = export_document(&Document::default(), at).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[EXPORTED_AT_KEY], "2026-10-18T08:00:00+00:00");
        assert_eq!(value["lastGroupSize"], 3);
    }

    #[test]
    fn test_exported_file_imports_back() {
        let mut doc = Document::default();
        doc.classrooms.push(crate::models::Classroom::new(
            "Lab".into(),
            vec!["Gal·la".into()],
        ));
        let raw = export_document(&doc, Utc::now()).unwrap();
        assert_eq!(parse_import(&raw).unwrap(), doc);
    }

    #[test]
    fn test_print_html_lists_groups() {
        let groups = vec![
            vec!["Aina".to_string(), "Biel".to_string()],
            vec!["Cai".to_string()],
        ];
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let html = print_html(&groups, Some("4t <A>"), date);
        assert!(html.contains("<h3>Group 1</h3>"));
        assert!(html.contains("<p>Aina, Biel</p>"));
        assert!(html.contains("<h3>Group 2</h3>"));
        assert!(html.contains("4t &lt;A&gt;"));
        assert!(html.contains("09/03/2026"));
    }

    #[test]
    fn test_print_html_unnamed_classroom() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let html = print_html(&[vec!["X".into()]], None, date);
        assert!(html.contains(UNNAMED_CLASSROOM));
    }
}
