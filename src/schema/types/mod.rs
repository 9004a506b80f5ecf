pub use crate::parquet_bridge::Repetition;
pub use parquet_format_safe::{
    DecimalType, IntType, LogicalType, TimeType, TimeUnit, TimestampType, Type,
};

mod spec;

mod physical_type;
pub use physical_type::*;

mod basic_type;
pub use basic_type::*;

mod converted_type;
pub use converted_type::*;

//mod logical_to_converted;

mod parquet_type;
pub use parquet_type::*;
