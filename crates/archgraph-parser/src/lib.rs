//! Source parsing for the architecture graph

pub mod error;
pub mod extractor;
pub mod parser;
pub mod parser_pool;
pub mod source_parser;


pub use error::ParseError;
pub use parser::{node_id_for_path, ArchitectureParser};
pub use parser_pool::{
    create_rust_parser_pool, default_worker_count, rust_parser_pool, ParseRequest, ParseResult,
    ParserPool,
};
pub use source_parser::RustSourceParser;
