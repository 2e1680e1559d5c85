//! Content engine: deterministic logic blocks and page templates.

pub mod logic;
pub mod templates;

pub use logic::{LogicBlockId, LogicFn, LogicRegistry};
pub use templates::{BlockSource, BlockSpec, PageTemplate, TemplateBlock, TemplateSpec};
