//! Server half of the encrypted transaction protocol.

use beeblex_crypto::{
    codec, decrypt, encrypt, CipherSuite, CryptoResult, EncryptedData, PrivateKey, SessionKey,
    WrapPadding,
};
use beeblex_types::{ReplyFrame, ResponseEnvelope, TransactionRequest};

/// An opened request: the recovered session key and the plaintext payload.
#[derive(Debug)]
pub struct OpenedRequest {
    pub session_key: SessionKey,
    pub payload: Vec<u8>,
}

/// Unwraps the session key and decrypts the payload of `request`.
pub fn open_request(
    private_key: &PrivateKey,
    padding: WrapPadding,
    suite: CipherSuite,
    request: &TransactionRequest,
) -> CryptoResult<OpenedRequest> {
    let wrapped = codec::decode(&request.encrypted_key)?;
    let session_key = SessionKey::from_slice(&private_key.unwrap_key(padding, &wrapped)?)?;

    let sealed = EncryptedData::from_base64(&request.ciphertext)?;
    let payload = decrypt(suite, &session_key, &sealed)?;

    Ok(OpenedRequest {
        session_key,
        payload,
    })
}

/// Seals `frame` with the client's session key.
pub fn seal_reply(
    suite: CipherSuite,
    session_key: &SessionKey,
    frame: &ReplyFrame,
) -> CryptoResult<ResponseEnvelope> {
    let sealed = encrypt(suite, session_key, &serde_json::to_vec(frame)?)?;
    Ok(ResponseEnvelope::sealed(sealed.to_base64()))
}
