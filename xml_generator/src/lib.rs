mod attribute_generator;
pub mod check_references;
pub mod config;
mod element_generator;
pub mod error;
pub mod fake_values;
mod fetch_elements;
pub mod fetch_types;
pub mod find_root;
pub mod generate;
pub mod generate_output;
mod generate_schema;
mod group_generator;
pub mod restriction;
pub mod schema_index;
pub mod schema_node;
mod type_generator;

pub use check_references::{Identity, ReferencePath, check_circular_references};
pub use config::GeneratorConfig;
pub use error::{Result, XMLGeneratorError};
pub use fake_values::{FakeSynthesizer, ValueSynthesizer};
pub use find_root::find_root_element;
pub use generate::BuiltinType;
pub use restriction::{ConstraintRecord, extract_constraints};
pub use schema_index::SchemaIndex;

use element_generator::ContentGenerator;
use rand::Rng;
use std::fs;
use std::path::Path;
use tracing::debug;
use xml_builder::XMLElement;

/// A loaded schema, ready to generate documents
///
/// Loading parses the schema, indexes it and rejects circular definitions, so
/// every document generated afterwards terminates. The generator is read-only
/// once built and can be shared between threads; each call brings its own
/// random source.
#[derive(Debug, Clone)]
pub struct XMLGenerator {
    index: SchemaIndex,
    config: GeneratorConfig,
}

impl XMLGenerator {
    /// Load a schema from its text
    ///
    /// Returns an `XMLGeneratorError::XSDParserError` if the text is not
    /// well-formed XML, an `XMLGeneratorError::SchemaStructureError` if it is
    /// not a usable schema and an `XMLGeneratorError::CircularReferenceError`
    /// if any definition contains itself.
    pub fn parse(xsd_string: &str) -> Result<Self> {
        let index = SchemaIndex::parse(xsd_string)?;
        check_circular_references(&index)?;

        Ok(XMLGenerator {
            index,
            config: GeneratorConfig::default(),
        })
    }

    /// Load a schema file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(XMLGeneratorError::SchemaNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading schema");
        let contents = fs::read_to_string(path)?;
        XMLGenerator::parse(&contents)
    }

    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Name of the element a document starts from
    ///
    /// A requested name must be declared in the schema; without one the
    /// root is chosen by [`find_root_element`].
    pub fn root_element(&self, root: Option<&str>) -> Result<String> {
        match root {
            Some(name) if self.index.element(name).is_some() => Ok(name.to_string()),
            Some(name) => Err(XMLGeneratorError::NoRootElement(Some(name.to_string()))),
            None => find_root_element(&self.index)
                .map(str::to_string)
                .ok_or(XMLGeneratorError::NoRootElement(None)),
        }
    }

    /// Generate one document tree using the `fake` backed value synthesizer
    pub fn generate_document<R: Rng>(&self, root: Option<&str>, rng: &mut R) -> Result<XMLElement> {
        self.generate_document_with(root, rng, &FakeSynthesizer)
    }

    /// Generate one document tree with a custom source of literals
    pub fn generate_document_with<R: Rng, S: ValueSynthesizer>(
        &self,
        root: Option<&str>,
        rng: &mut R,
        synthesizer: &S,
    ) -> Result<XMLElement> {
        let root = self.root_element(root)?;
        debug!(root = %root, "generating document");

        let mut generator = ContentGenerator::new(&self.index, &self.config, synthesizer, rng);
        generator.generate_root(&root)
    }

    /// Generate one document and serialize it
    pub fn generate_string<R: Rng>(&self, root: Option<&str>, rng: &mut R) -> Result<String> {
        let document = self.generate_document(root, rng)?;
        generate_output::render(document)
    }

    /// Generate one document and write it to `path`
    pub fn write<R: Rng>(&self, root: Option<&str>, path: impl AsRef<Path>, rng: &mut R) -> Result<()> {
        let document = self.generate_document(root, rng)?;
        generate_output::write_output(document, path.as_ref())
    }
}

/// Generate an XML string containing fake data
///
/// Using an XSD file contents as a string, generate an XML document string
/// that follows the schema, with leaf values drawn at random within the
/// declared types and restrictions.
///
/// The schema is parsed with `roxmltree`; malformed input returns an
/// `XMLGeneratorError::XSDParserError`. A document that is not a schema, or
/// that defines nothing, returns an `XMLGeneratorError::SchemaStructureError`,
/// and a schema whose definitions contain themselves returns an
/// `XMLGeneratorError::CircularReferenceError` before anything is generated.
///
/// The root element is chosen among the global elements no other definition
/// references. The output is built with the `xml_builder` crate; if it fails
/// to render, an `XMLGeneratorError::XMLBuilderError` is returned.
pub fn generate_xml(xsd_string: &str) -> Result<String> {
    XMLGenerator::parse(xsd_string)?.generate_string(None, &mut rand::rng())
}

/// Same as [`generate_xml`], starting from the element named `root`
pub fn generate_xml_with_root(xsd_string: &str, root: &str) -> Result<String> {
    XMLGenerator::parse(xsd_string)?.generate_string(Some(root), &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    const GREETING: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:element name="Greeting">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Text" type="xs:string"/>
            </xs:sequence>
          </xs:complexType>
        </xs:element>
      </xs:schema>"#;

    #[test]
    fn test_generator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XMLGenerator>();
    }

    #[test]
    fn test_root_element() {
        let generator = XMLGenerator::parse(GREETING).unwrap();

        assert_eq!(generator.root_element(None).unwrap(), "Greeting");
        assert_eq!(generator.root_element(Some("Text")).unwrap(), "Text");
        assert!(matches!(
            generator.root_element(Some("Farewell")),
            Err(XMLGeneratorError::NoRootElement(Some(_)))
        ));
    }

    #[test]
    fn test_generate_string() {
        let generator = XMLGenerator::parse(GREETING).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(1);

        let output = generator.generate_string(None, &mut rng).unwrap();
        let document = roxmltree::Document::parse(&output).unwrap();
        assert_eq!(document.root_element().tag_name().name(), "Greeting");
    }

    #[test]
    fn test_missing_schema_file() {
        let result = XMLGenerator::from_path("does/not/exist.xsd");
        assert!(matches!(result, Err(XMLGeneratorError::SchemaNotFound(_))));
    }

    #[test]
    fn test_generate_xml() {
        let output = generate_xml(GREETING).unwrap();
        assert!(output.contains("<Greeting>"));

        let output = generate_xml_with_root(GREETING, "Text").unwrap();
        let document = roxmltree::Document::parse(&output).unwrap();
        assert_eq!(document.root_element().tag_name().name(), "Text");
    }
}
