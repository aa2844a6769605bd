//! Example `MapReduce` plug-ins, used as the CLI's default and by the
//! test suite's boundary scenarios.

pub mod identity;
pub mod wordcount;
