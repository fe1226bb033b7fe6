pub mod board;
pub mod chart;
pub mod panel;
pub mod table;
