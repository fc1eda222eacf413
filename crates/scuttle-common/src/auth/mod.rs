//! Credential hashing and generation

mod credentials;

pub use credentials::{
    generate_password, generate_private_key_candidate, hash_password, login_cookie_hash,
    verify_password, LoginCookie, GENERATED_PASSWORD_LEN,
};
