pub mod text;
pub mod upload;
