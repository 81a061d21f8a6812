pub mod analytics;
pub mod assessments;
pub mod core;
pub mod modules;
pub mod profile;
pub mod tasks;
pub mod years;
