//! Excel import/export for datasets

mod reader;
mod writer;

pub use reader::read_excel;
pub use writer::write_excel;
