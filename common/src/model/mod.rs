pub mod certificate;
pub mod import;
