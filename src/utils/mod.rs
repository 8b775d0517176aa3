pub mod extract;
pub mod flash;
pub mod form;
