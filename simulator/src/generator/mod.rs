pub mod series;
pub mod template;
