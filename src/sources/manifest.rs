//! OSGi `Bundle-License` header of a JAR manifest.
//!
//! ```text
//! Bundle-License: Apache-2.0;link="https://www.apache.org/licenses/LICENSE-2.0",
//!  EPL-2.0;description="Eclipse Public License 2.0"
//! ```

use crate::license::expression::FreeText;

pub const BUNDLE_LICENSE: &str = "Bundle-License";

/// Value of `name` in the main section, with continuation lines joined.
pub fn header(manifest: &str, name: &str) -> Option<String> {
    let mut found: Option<String> = None;
    let mut in_header = false;

    for line in manifest.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            // End of the main section.
            break;
        }
        if let Some(continuation) = line.strip_prefix(' ') {
            if in_header {
                if let Some(value) = found.as_mut() {
                    value.push_str(continuation);
                }
            }
            continue;
        }
        in_header = false;
        if let Some((key, value)) = line.split_once(':') {
            if key.eq_ignore_ascii_case(name) {
                found = Some(value.trim_start().to_string());
                in_header = true;
            }
        }
    }
    found
}

/// Every license listed in the `Bundle-License` header.
pub fn bundle_licenses(manifest: &str) -> Vec<FreeText> {
    let Some(value) = header(manifest, BUNDLE_LICENSE) else {
        return Vec::new();
    };
    if value.trim() == "<<EXTERNAL>>" {
        return Vec::new();
    }
    split_unquoted(&value, ',')
        .into_iter()
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Option<FreeText> {
    let mut parts = split_unquoted(entry, ';').into_iter();
    let name = unquote(parts.next()?.trim());
    if name.is_empty() {
        return None;
    }

    let mut link = None;
    let mut description = None;
    for attribute in parts {
        let Some((key, value)) = attribute.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_end_matches(':');
        let value = unquote(value.trim());
        match key {
            "link" => link = Some(value),
            "description" => description = Some(value),
            _ => {}
        }
    }

    let is_url = name.contains("://");
    let title = match (&description, is_url) {
        (Some(description), true) => description.clone(),
        _ => name.clone(),
    };
    let mut text = FreeText::new(title);
    if is_url {
        text = text.with_uri(name);
    }
    if let Some(link) = link {
        text = text.with_uri(link);
    }
    Some(text)
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// Split on `separator` where it is not inside double quotes.
fn split_unquoted(value: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            parts.push(&value[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&value[start..]);
    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "Manifest-Version: 1.0\r\n\
Bundle-SymbolicName: org.example.core\r\n\
Bundle-License: Apache-2.0;link=\"https://www.apache.org/licenses/LICENSE-2.0\",\r\n \
EPL-2.0;description=\"Eclipse Public License, 2.0\"\r\n\
Bundle-Version: 1.2.3\r\n\
\r\n\
Name: org/example/\r\n\
Bundle-License: MIT\r\n";

    #[test]
    fn test_header_joins_continuation_lines() {
        assert_eq!(
            header(MANIFEST, "bundle-license").unwrap(),
            "Apache-2.0;link=\"https://www.apache.org/licenses/LICENSE-2.0\",EPL-2.0;description=\"Eclipse Public License, 2.0\""
        );
        assert_eq!(header(MANIFEST, "Bundle-Version").unwrap(), "1.2.3");
        assert!(header(MANIFEST, "Export-Package").is_none());
    }

    #[test]
    fn test_bundle_licenses_split_outside_quotes() {
        let licenses = bundle_licenses(MANIFEST);
        assert_eq!(
            licenses,
            vec![
                FreeText::new("Apache-2.0").with_uri("https://www.apache.org/licenses/LICENSE-2.0"),
                FreeText::new("EPL-2.0"),
            ]
        );
    }

    #[test]
    fn test_url_name_becomes_uri() {
        let manifest =
            "Bundle-License: http://www.apache.org/licenses/LICENSE-2.0.txt;description=\"Apache License 2.0\"\n";
        assert_eq!(
            bundle_licenses(manifest),
            vec![FreeText::new("Apache License 2.0")
                .with_uri("http://www.apache.org/licenses/LICENSE-2.0.txt")]
        );
    }

    #[test]
    fn test_long_value_split_across_lines() {
        let manifest = "Bundle-License: Eclipse Public License - v 1.0;link=\"http://www.ecl\n ipse.org/legal/epl-v10.html\"\n";
        let licenses = bundle_licenses(manifest);
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0].title, "Eclipse Public License - v 1.0");
        assert!(licenses[0]
            .uris
            .contains("http://www.eclipse.org/legal/epl-v10.html"));
    }

    #[test]
    fn test_external_and_missing() {
        assert!(bundle_licenses("Bundle-License: <<EXTERNAL>>\n").is_empty());
        assert!(bundle_licenses("Manifest-Version: 1.0\n").is_empty());
    }
}
