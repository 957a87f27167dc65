pub mod assembler;
pub mod measure;
pub mod meta;
pub mod pipeline;
pub mod roles;
pub mod timeline;

pub use assembler::CirAssembler;
pub use pipeline::{load_source, Conversion, ConversionJob, ConversionPipeline};
pub use roles::{Role, RoleClassifier, RoleMap};
pub use timeline::EventTimelineBuilder;
