//! Project discovery: the module list from the settings script and each
//! module's build file and compiled output directories.

mod file_finder;
mod settings;

pub use file_finder::{
    find_class_files, ClassDir, ClassRole, ModuleLayout, BUILD_FILES, CLASS_DIRS,
};
pub use settings::{find_settings_file, parse_settings, read_module_names, SETTINGS_FILES};
