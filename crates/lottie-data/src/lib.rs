// lottie-data: Serde structs for Lottie JSON format
pub mod model;
