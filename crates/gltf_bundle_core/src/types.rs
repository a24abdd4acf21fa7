pub use self::descriptor::*;
pub use self::file_type::*;

mod descriptor;
mod file_type;
