//! Text-family transforms: markdown rendering, tag stripping, CSV and JSON
//! restructuring

use pulldown_cmark::{html, Parser};

use crate::{Error, Result};

fn failed(to: &'static str, reason: impl ToString) -> Error {
    Error::ConversionFailed {
        to: to.to_string(),
        reason: reason.to_string(),
    }
}

/// Render markdown source to an HTML document fragment.
pub fn markdown_to_html(data: &[u8]) -> Result<Vec<u8>> {
    let source = std::str::from_utf8(data).map_err(|e| failed("text/html", e))?;
    let mut out = String::with_capacity(source.len() * 2);
    html::push_html(&mut out, Parser::new(source));
    Ok(out.into_bytes())
}

/// Strip markup from HTML, leaving the text content.
///
/// A full DOM walk is not needed here: tags are dropped wholesale and the
/// handful of entities markdown renderers emit are decoded.
pub fn html_to_plain(data: &[u8]) -> Result<Vec<u8>> {
    let source = std::str::from_utf8(data).map_err(|e| failed("text/plain", e))?;

    let mut out = String::with_capacity(source.len());
    let mut in_tag = false;
    for c in source.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    // &amp; last, so already-decoded entities are not decoded twice
    let out = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    Ok(out.into_bytes())
}

/// Parse CSV rows into a JSON array of objects keyed by the header row.
///
/// Field values stay strings; no numeric coercion.
pub fn csv_to_json(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader
        .headers()
        .map_err(|e| failed("application/json", e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| failed("application/json", e))?;
        let mut row = serde_json::Map::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(
                header.to_string(),
                serde_json::Value::String(field.to_string()),
            );
        }
        rows.push(serde_json::Value::Object(row));
    }

    serde_json::to_vec(&rows).map_err(|e| failed("application/json", e))
}

/// Parse JSON and re-serialize it as YAML.
pub fn json_to_yaml(data: &[u8]) -> Result<Vec<u8>> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| failed("application/yaml", e))?;
    let yaml = serde_yaml::to_string(&value).map_err(|e| failed("application/yaml", e))?;
    Ok(yaml.into_bytes())
}

/// Pass text through as UTF-8 with no structural transform.
pub fn to_utf8_text(data: &[u8]) -> Result<Vec<u8>> {
    std::str::from_utf8(data).map_err(|e| failed("text/plain", e))?;
    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html() {
        let out = markdown_to_html(b"## Hey\n\nHi **you**").unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<h2>Hey</h2>"));
        assert!(html.contains("<strong>you</strong>"));
    }

    #[test]
    fn test_markdown_to_html_rejects_invalid_utf8() {
        let err = markdown_to_html(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
    }

    #[test]
    fn test_html_to_plain_strips_tags() {
        let out = html_to_plain(b"<h1>Title</h1><p>Hello <em>there</em></p>").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "TitleHello there");
    }

    #[test]
    fn test_html_to_plain_decodes_entities() {
        let out = html_to_plain(b"<p>a &lt; b &amp;&amp; c &gt; d</p>").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a < b && c > d");
    }

    #[test]
    fn test_csv_to_json() {
        let out = csv_to_json(b"name,age\nJohn,30").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"name":"John","age":"30"}]"#
        );
    }

    #[test]
    fn test_csv_to_json_multiple_rows() {
        let out = csv_to_json(b"a,b\n1,2\n3,4").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["b"], "4");
    }

    #[test]
    fn test_csv_to_json_malformed() {
        // A row with more fields than the header errors on read
        let err = csv_to_json(b"a,b\n1,2,3").unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
    }

    #[test]
    fn test_json_to_yaml() {
        let out = json_to_yaml(br#"{"name":"John","age":30}"#).unwrap();
        let yaml = String::from_utf8(out).unwrap();
        assert!(yaml.contains("name: John"));
        assert!(yaml.contains("age: 30"));
    }

    #[test]
    fn test_json_to_yaml_malformed() {
        let err = json_to_yaml(b"{not json").unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
    }

    #[test]
    fn test_to_utf8_text_round_trips() {
        let out = to_utf8_text("héllo".as_bytes()).unwrap();
        assert_eq!(out, "héllo".as_bytes());
    }
}
