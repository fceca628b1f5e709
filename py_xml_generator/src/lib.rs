use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use xmlgenerator::{XMLGeneratorError, generate_xml, generate_xml_with_root};

fn generate_parser_error(err_string: String) -> PyErr {
    PyValueError::new_err("XSD Parser encountered an error.\n".to_owned() + err_string.as_str())
}

fn generate_schema_error(message: String) -> PyErr {
    PyValueError::new_err("Input not in valid format: ".to_owned() + message.as_str())
}

fn generate_xml_builder_error(err_string: String) -> PyErr {
    PyRuntimeError::new_err("XMLBuilder encountered an error\n".to_owned() + err_string.as_str())
}

fn get_error(error: XMLGeneratorError) -> PyErr {
    match error {
        XMLGeneratorError::XSDParserError(x) => generate_parser_error(x),
        XMLGeneratorError::XMLBuilderError(x) => generate_xml_builder_error(x),
        err @ (XMLGeneratorError::SchemaStructureError(_)
        | XMLGeneratorError::CircularReferenceError(_)
        | XMLGeneratorError::NoRootElement(_)) => generate_schema_error(err.to_string()),
        err @ (XMLGeneratorError::SchemaNotFound(_)
        | XMLGeneratorError::RecursionLimitExceeded { .. }
        | XMLGeneratorError::Io(_)) => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Generate an XML document with fake data from the contents of an XSD file
///
/// `root` names the document element; without it the generator picks one.
#[pyfunction]
#[pyo3(signature = (xsd_string, root=None))]
fn generate(xsd_string: String, root: Option<String>) -> PyResult<String> {
    let result = match root {
        Some(root) => generate_xml_with_root(&xsd_string, &root),
        None => generate_xml(&xsd_string),
    };

    result.map_err(get_error)
}

/// A Python module implemented in Rust.
#[pymodule]
fn pyxmlgenerator(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(generate, m)?)?;
    Ok(())
}
