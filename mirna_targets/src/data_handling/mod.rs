pub mod any_dataset;
pub mod mirdb_dataset;
pub mod targetscan;
