//! Wire models shared by the certificate service surfaces.

pub mod model;
pub mod responses;
