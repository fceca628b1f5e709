use crate::error::{Result, XMLGeneratorError};
use std::fs;
use std::path::Path;
use tracing::debug;
use xml_builder::{XMLBuilder, XMLElement, XMLVersion};

/// Serialize an output tree with an XML 1.0 / UTF-8 declaration, indented
pub fn render(root: XMLElement) -> Result<String> {
    let mut xml = XMLBuilder::new()
        .version(XMLVersion::XML1_0)
        .encoding("UTF-8".into())
        .build();

    let mut writer: Vec<u8> = Vec::new();
    xml.set_root_element(root);
    xml.generate(&mut writer)
        .map_err(|err| XMLGeneratorError::XMLBuilderError(err.to_string()))?;

    String::from_utf8(writer).map_err(|err| XMLGeneratorError::XMLBuilderError(err.to_string()))
}

/// Serialize `root` and write it to `path`
pub fn write_output(root: XMLElement, path: &Path) -> Result<()> {
    let output = render(root)?;
    fs::write(path, output)?;

    debug!(path = %path.display(), "wrote generated document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_declaration() {
        let mut root = XMLElement::new("Note");
        root.add_attribute("lang", "en");
        root.add_text("hello".to_string()).unwrap();

        let output = render(root).unwrap();
        assert!(output.starts_with("<?xml version=\"1.0\""));
        assert!(output.contains("encoding=\"UTF-8\""));

        let document = roxmltree::Document::parse(&output).unwrap();
        assert_eq!(document.root_element().attribute("lang"), Some("en"));
        assert_eq!(document.root_element().text(), Some("hello"));
    }
}
