pub mod attribute;
pub mod document_store;
pub mod dynamo;
pub mod memory;
pub mod table;
pub mod tables;
