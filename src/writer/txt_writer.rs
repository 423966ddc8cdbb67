use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::database::Assignment;
use crate::error::WriterError;

/// Plain-text assignment list, one `element - cluster` pair per line.
pub struct TxtWriter;

impl TxtWriter {
    pub fn write_assignments<W: Write>(writer: &mut W, assignments: &[Assignment]) -> Result<(), WriterError> {
        for assignment in assignments {
            writeln!(writer, "{} - {}", assignment.element_id, assignment.cluster_id)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_assignments_file(output_path: &Path, assignments: &[Assignment]) -> Result<(), WriterError> {
        let mut writer = BufWriter::new(File::create(output_path)?);
        Self::write_assignments(&mut writer, assignments)
    }
}
