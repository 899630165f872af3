pub mod panels;
pub mod plot;
pub mod rankings;
pub mod table;
