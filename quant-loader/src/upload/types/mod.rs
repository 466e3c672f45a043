//! Core types for warehouse uploads

pub mod dataset;
pub mod identifier;
pub mod metadata;
pub mod mode;
pub mod value;

pub use dataset::{Column, ColumnType, Dataset, DatasetError};
pub use identifier::{TableIdentifier, quote_ident};
pub use metadata::{ExistingColumn, ExistingTableMetadata};
pub use mode::UploadMode;
pub use value::Value;
