use crate::secrets::Secrets;
use subtle::ConstantTimeEq;

/// Whether `token` matches the configured dialer bearer token, compared in
/// constant time.
pub fn check_token(token: &str, secrets: &Secrets) -> bool {
    let expected = secrets.webcall_token.as_bytes();
    let given = token.as_bytes();

    expected.len() == given.len() && expected.ct_eq(given).into()
}
