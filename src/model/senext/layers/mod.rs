pub mod attention;
pub mod bottleneck;
pub mod conv;
