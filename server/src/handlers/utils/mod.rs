pub mod forms;
pub mod responses;
pub mod static_files;
