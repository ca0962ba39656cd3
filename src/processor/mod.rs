pub mod json_flattener;
pub mod key_resolver;
pub mod pipeline;
pub mod record_mapper;
pub mod similarity;
pub mod table_assembler;

pub use json_flattener::*;
pub use key_resolver::*;
pub use pipeline::*;
pub use record_mapper::*;
pub use similarity::SimilarityScorer;
pub use table_assembler::*;
