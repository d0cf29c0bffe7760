pub mod body;
pub mod credentials;
pub mod gmail;
pub mod oauth;
