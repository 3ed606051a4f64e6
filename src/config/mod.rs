pub mod models;
pub mod resolver;

pub use models::DroveConfigSection;
pub use resolver::{default_config_path, load_config_file, resolve_session, ConnectionOverrides};
