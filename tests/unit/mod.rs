pub mod jwt_tests;
pub mod text_tests;
