pub mod time_source;
