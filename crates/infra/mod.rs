pub mod db;
pub mod generation;
