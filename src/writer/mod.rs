pub mod txt_writer;
pub mod xml_writer;
