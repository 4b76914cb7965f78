//! Tree-sitter based extent extraction for C translation units.

use super::{ExtentSource, FunctionExtent};
use crate::error::Error;
use tree_sitter::{Node, Parser};

/// Extracts function definitions from the text of a single C translation
/// unit.
///
/// Because the analyzer sees one text and never follows `#include`, every
/// extent it returns originates in the analyzed file; the `file` field is
/// filled with the label the caller passes in.
#[derive(Debug, Clone, Copy, Default)]
pub struct CSourceAnalyzer;

impl CSourceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl ExtentSource for CSourceAnalyzer {
    type Error = Error;

    fn function_extents(&self, source: &str, file: &str) -> Result<Vec<FunctionExtent>, Error> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| Error::parse_failure(format!("loading C grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::parse_failure(format!("parsing {file}")))?;

        let mut extents = Vec::new();
        collect_functions(tree.root_node(), source, file, &mut extents);
        Ok(extents)
    }
}

/// Collect `function_definition` nodes, recursing through containers such
/// as preprocessor conditionals and `extern "C"` blocks.
fn collect_functions(node: Node, source: &str, file: &str, out: &mut Vec<FunctionExtent>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "function_definition" {
            if let Some(name) = child
                .child_by_field_name("declarator")
                .and_then(|d| declarator_name(d, source))
            {
                out.push(FunctionExtent {
                    name,
                    file: file.to_owned(),
                    start_line: child.start_position().row as u32 + 1,
                    end_line: child.end_position().row as u32 + 1,
                });
            }
        } else {
            collect_functions(child, source, file, out);
        }
    }
}

/// Resolve the function name from a declarator (may be nested in
/// pointer_declarator for pointer-returning functions).
fn declarator_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "function_declarator" | "pointer_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            declarator_name(inner, source)
        }
        _ => Some(node_text(node, source).to_owned()),
    }
}

/// Get the text content of a node.
fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}
