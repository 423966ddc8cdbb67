pub mod geometric_analysis;
