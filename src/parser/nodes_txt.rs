use std::fs::File;
use std::io::{self, BufRead, BufReader};                // Buffered reading is more efficient for line-by-line processing
use std::path::Path;
use std::str::FromStr;

use crate::database::*;                                 // Node, Element, MeshData
use crate::error::*;                                    // ParseError

// Fixed field layout of an element record. The record carries 8 connectivity
// slots (a hexahedral-style layout) that repeat ids for tetrahedra.
const ELEMENT_ID_FIELD: usize = 10;
const FIRST_NODE_FIELD: usize = 11;
const NODE_SLOTS: usize = 8;
const MIN_ELEMENT_FIELDS: usize = FIRST_NODE_FIELD + NODE_SLOTS;

// Header counts are not trusted for preallocation beyond this many records
const MAX_PREALLOCATED_RECORDS: usize = 1 << 20;

/// Parser for the `nodes.txt` mesh export:
///
/// ```text
/// N M                      header: node count, element count
/// id x y z                 N node lines
/// <separator>              one line, ignored
/// ... id n1 n2 .. n8 ...   M element lines, id at field 10, slots at 11..19
/// ```
pub struct NodesTxtParser;

/// Line iterator that remembers the 1-based number of the last line read.
struct NumberedLines<I> {
    lines: I,
    line_no: usize,
}

impl<I: Iterator<Item = io::Result<String>>> NumberedLines<I> {
    fn next_line(&mut self, what: &str) -> Result<String, ParseError> {
        let line = self.lines.next().ok_or_else(|| {
            ParseError::FormatError(format!(
                "unexpected end of file after line {} while reading {}",
                self.line_no, what
            ))
        })??;
        self.line_no += 1;
        Ok(line)
    }
}

impl NodesTxtParser {
    /// Public method to parse a mesh file from disk
    pub fn parse_file<P: AsRef<Path>>(filename: P) -> Result<MeshData, ParseError> {
        let mesh_file = File::open(filename.as_ref())?;         // Opens file and ? propagates errors (NotFound included)
        Self::parse(BufReader::new(mesh_file))                  // Delegates to the stream parser
    }

    /// Parse a mesh from any buffered text stream
    pub fn parse<R: BufRead>(reader: R) -> Result<MeshData, ParseError> {
        let mut lines = NumberedLines { lines: reader.lines(), line_no: 0 };

        let (num_nodes, num_elements) = Self::parse_header(&mut lines)?;
        let nodes = Self::parse_nodes(&mut lines, num_nodes)?;

        // Separator line between the node and element blocks, content ignored
        if num_elements > 0 {
            lines.next_line("separator line")?;
        }

        let elements = Self::parse_elements(&mut lines, num_elements)?;

        Ok(MeshData { num_nodes, num_elements, nodes, elements })
    }

    // Reads "N M" from the first line
    fn parse_header<I>(lines: &mut NumberedLines<I>) -> Result<(usize, usize), ParseError>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let header = lines.next_line("header")?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ParseError::FormatError(format!(
                "header must hold node and element counts, found '{}'",
                header.trim()
            )));
        }

        let num_nodes = Self::parse_field(fields[0], "node count", lines.line_no)?;
        let num_elements = Self::parse_field(fields[1], "element count", lines.line_no)?;
        Ok((num_nodes, num_elements))
    }

    // Parse node coordinates section. Node ids must run 1, 2, 3, ... so that
    // node `id` lives at index `id - 1`.
    fn parse_nodes<I>(lines: &mut NumberedLines<I>, num_nodes: usize) -> Result<Vec<Node>, ParseError>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let mut nodes = Vec::with_capacity(num_nodes.min(MAX_PREALLOCATED_RECORDS));

        for position in 0..num_nodes {
            let line = lines.next_line("node data")?;
            let fields: Vec<&str> = line.split_whitespace().collect();   // id x y z
            if fields.len() < 4 {
                return Err(ParseError::FormatError(format!(
                    "line {}: node record has {} fields, expected 4",
                    lines.line_no,
                    fields.len()
                )));
            }

            let id: usize = Self::parse_field(fields[0], "node id", lines.line_no)?;
            if id != position + 1 {
                return Err(ParseError::FormatError(format!(
                    "line {}: node id {} out of sequence, expected {}",
                    lines.line_no,
                    id,
                    position + 1
                )));
            }

            let mut coordinates = [0.0; 3];
            for (axis, field) in coordinates.iter_mut().zip(&fields[1..4]) {
                *axis = Self::parse_field(field, "coordinate", lines.line_no)?;
            }

            nodes.push(Node { id, coordinates });
        }
        Ok(nodes)
    }

    // Parse element records, collapsing the 8 connectivity slots to distinct ids
    fn parse_elements<I>(lines: &mut NumberedLines<I>, num_elements: usize) -> Result<Vec<Element>, ParseError>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let mut elements = Vec::with_capacity(num_elements.min(MAX_PREALLOCATED_RECORDS));

        for _ in 0..num_elements {
            let line = lines.next_line("element data")?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_ELEMENT_FIELDS {
                return Err(ParseError::FormatError(format!(
                    "line {}: element record has {} fields, expected at least {}",
                    lines.line_no,
                    fields.len(),
                    MIN_ELEMENT_FIELDS
                )));
            }

            let id = Self::parse_field(fields[ELEMENT_ID_FIELD], "element id", lines.line_no)?;

            let mut slots = [0usize; NODE_SLOTS];
            for (slot, field) in slots.iter_mut().zip(&fields[FIRST_NODE_FIELD..MIN_ELEMENT_FIELDS]) {
                *slot = Self::parse_field(field, "node id", lines.line_no)?;
            }

            elements.push(Element::from_raw_slots(id, &slots));
        }
        Ok(elements)
    }

    fn parse_field<T: FromStr>(token: &str, what: &str, line_no: usize) -> Result<T, ParseError>
    where
        T::Err: std::fmt::Display,
    {
        token.parse::<T>().map_err(|err| {
            ParseError::NumberParseError(format!(
                "line {}: invalid {} '{}': {}",
                line_no, what, token, err
            ))
        })
    }
}
