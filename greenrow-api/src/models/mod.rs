mod request;

pub use request::*;

/// Physical row identifier, an opaque key
pub type RowId = u8;
