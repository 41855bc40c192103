//! Traits at the seams of the mapper
//!
//! Storage drivers, the per-backend strategy, the marshaling pipeline and the
//! user hooks (validation, defaults) are all expressed as traits so a mapper
//! can be assembled from interchangeable parts.

pub mod defaults;
pub mod driver;
pub mod mapper;
pub mod marshaler;
pub mod validation;

pub use defaults::DefaultsHook;
pub use driver::{DocumentStore, MetaRow, MetadataStore, QueryOutcome, RelationalDriver};
pub use mapper::{BackendKind, EntityMapper, MapperContext, QueryBuilder};
pub use marshaler::Marshaler;
pub use validation::{EntityValidator, FieldError, RequiredFields, Validation};
