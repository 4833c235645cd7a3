pub mod clock;
pub mod flash;
pub mod json_responder;
pub mod jwt;
