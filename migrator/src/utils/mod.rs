pub mod naming;

pub use naming::{package_name, random_token, run_id, PACKAGE_SUFFIX_LEN};
