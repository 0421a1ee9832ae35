pub mod case;
pub mod errors;
pub mod pagination;
pub mod shutdown;

pub use errors::*;
pub use pagination::{Page, PageInfo, PageRequest, PageRequestError, PageWindow};
