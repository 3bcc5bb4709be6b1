mod dependency;
mod module;

pub use dependency::{
    is_declaration_line, parse_declaration, parse_declarations, Dependency, DependencyKind,
    ParseDependencyError, EXTERNAL_LIBRARY_PREFIX, PROJECT_ACCESSOR_PREFIX,
};
pub use module::{module_dir, Module};
