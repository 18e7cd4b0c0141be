//! American Association of Motor Vehicle Administrators.
pub mod dlid;
