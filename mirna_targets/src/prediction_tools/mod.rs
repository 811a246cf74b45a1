pub mod html_table;
pub mod mirdb_integration;
pub mod mirdb_query;
