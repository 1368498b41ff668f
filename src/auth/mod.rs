pub mod auth_service;
pub mod callback_server;
pub mod handshake;
pub mod messages;
pub mod pkce;
pub mod window;

pub use auth_service::AuthService;
pub use handshake::{HandshakeError, PopupLauncher};
