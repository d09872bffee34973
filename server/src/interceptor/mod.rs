pub mod layer;
pub mod paths;

pub use layer::{InterceptorLayer, InterceptorService};
pub use paths::{PATHNAME_HEADER, PUBLIC_PATHS, SETUP_PATH};
