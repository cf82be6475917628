pub mod component_factory;
pub mod service_factory;
pub mod template_factory;

pub use component_factory::ComponentDeclarationFactory;
pub use service_factory::ServiceDeclarationFactory;
pub use template_factory::{TemplateDeclarationFactory, TemplateWidget};
