pub mod taint_analysis;
