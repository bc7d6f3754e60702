use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::license::expression::FreeText;

#[derive(Default)]
struct Entry {
    name: String,
    url: String,
}

impl Entry {
    fn into_free_text(self) -> Option<FreeText> {
        let name = self.name.trim();
        let url = self.url.trim();
        if name.is_empty() && url.is_empty() {
            return None;
        }
        let title = if name.is_empty() { url } else { name };
        let mut text = FreeText::new(title);
        if !url.is_empty() {
            text = text.with_uri(url);
        }
        Some(text)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Name,
    Url,
}

/// Every `<licenses><license>` entry of a POM, as `name` plus `url`.
pub fn extract_licenses(xml: &str) -> Result<Vec<FreeText>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut licenses = Vec::new();
    let mut current: Option<Entry> = None;
    let mut field = Field::None;
    let mut in_licenses = false;
    let mut depth: u32 = 0;
    let mut licenses_depth: u32 = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                match tag.as_str() {
                    // Only the project's own block, not one nested in a profile or plugin.
                    "licenses" if !in_licenses && depth == 2 => {
                        in_licenses = true;
                        licenses_depth = depth;
                    }
                    "license" if in_licenses && depth == licenses_depth + 1 => {
                        current = Some(Entry::default());
                    }
                    "name" if current.is_some() => field = Field::Name,
                    "url" if current.is_some() => field = Field::Url,
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if field != Field::None => {
                let text = e.unescape().map_err(|err| Error::Xml(err.to_string()))?;
                if let Some(entry) = current.as_mut() {
                    match field {
                        Field::Name => entry.name.push_str(&text),
                        Field::Url => entry.url.push_str(&text),
                        Field::None => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                match tag.as_str() {
                    "name" | "url" => field = Field::None,
                    "license" if depth == licenses_depth + 1 => {
                        if let Some(text) = current.take().and_then(Entry::into_free_text) {
                            licenses.push(text);
                        }
                    }
                    "licenses" if in_licenses && depth == licenses_depth => break,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(Error::Xml(format!(
                    "{} at position {}",
                    err,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(licenses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_licenses_from_pom() {
        let pom = r#"<?xml version="1.0"?>
<project>
  <licenses>
    <license>
      <name>Apache License, Version 2.0</name>
      <url>https://www.apache.org/licenses/LICENSE-2.0</url>
    </license>
  </licenses>
</project>"#;
        let licenses = extract_licenses(pom).unwrap();
        assert_eq!(
            licenses,
            vec![FreeText::new("Apache License, Version 2.0")
                .with_uri("https://www.apache.org/licenses/LICENSE-2.0")]
        );
    }

    #[test]
    fn test_multiple_licenses_are_reported_separately() {
        let pom = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <licenses>
    <license><name>EPL 2.0</name></license>
    <license><name>GPL2 w/ CPE</name><url>https://www.gnu.org/software/classpath/license.html</url></license>
  </licenses>
</project>"#;
        let licenses = extract_licenses(pom).unwrap();
        assert_eq!(licenses.len(), 2);
        assert_eq!(licenses[0], FreeText::new("EPL 2.0"));
        assert_eq!(licenses[1].title, "GPL2 w/ CPE");
    }

    #[test]
    fn test_url_only_license_uses_url_as_title() {
        let pom = "<project><licenses><license><url>https://opensource.org/licenses/MIT</url></license></licenses></project>";
        let licenses = extract_licenses(pom).unwrap();
        assert_eq!(licenses[0].title, "https://opensource.org/licenses/MIT");
    }

    #[test]
    fn test_ignores_nested_name_elements() {
        let pom = r#"<project>
  <name>My Project</name>
  <developers><developer><name>Jane</name></developer></developers>
  <licenses><license><name>MIT</name></license></licenses>
</project>"#;
        assert_eq!(extract_licenses(pom).unwrap(), vec![FreeText::new("MIT")]);
    }

    #[test]
    fn test_no_licenses() {
        assert!(extract_licenses("<project/>").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        let err = extract_licenses("<project><licenses></project>").unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }
}
