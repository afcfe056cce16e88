use std::convert::Infallible;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use common::stream::Encoding;

/// Show the identity's address and keys
#[derive(Debug, Clone)]
pub struct PrintIdentity {
    /// Reveal the private key instead of "Hidden"
    pub show_private: bool,
}

fn encode_key(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Binary => hex::encode(bytes),
        Encoding::Base64 => STANDARD.encode(bytes),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for PrintIdentity {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = &ctx.identity;
        let encoding = ctx.io.encoding;

        let mut lines = vec![
            format!("Address     : {}", identity.address_hash()),
            format!(
                "Public Key  : {}",
                encode_key(&identity.public_key().to_bytes(), encoding)
            ),
        ];
        if let Some(secret_key) = identity.secret_key() {
            if self.show_private {
                lines.push(format!(
                    "Private Key : {}",
                    encode_key(&secret_key.to_bytes(), encoding)
                ));
            } else {
                lines.push("Private Key : Hidden".to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cli::op::{IoOptions, Op, OpContext};
    use common::identity::Identity;

    #[tokio::test]
    async fn test_private_key_hidden_by_default() {
        let identity = Identity::generate();
        let secret_hex = identity.secret_key().unwrap().to_hex();
        let ctx = OpContext::new(identity, IoOptions::default());

        let hidden = PrintIdentity { show_private: false }
            .execute(&ctx)
            .await
            .unwrap();
        assert!(hidden.contains("Private Key : Hidden"));
        assert!(!hidden.contains(&secret_hex));

        let shown = PrintIdentity { show_private: true }
            .execute(&ctx)
            .await
            .unwrap();
        assert!(shown.contains(&secret_hex));
    }

    #[tokio::test]
    async fn test_public_only_has_no_private_line() {
        let identity = Identity::generate().to_public();
        let public_hex = identity.public_key().to_hex();
        let ctx = OpContext::new(identity, IoOptions::default());

        let printed = PrintIdentity { show_private: true }
            .execute(&ctx)
            .await
            .unwrap();
        assert!(printed.contains(&public_hex));
        assert!(!printed.contains("Private Key"));
    }

    #[tokio::test]
    async fn test_base64_keys() {
        let identity = Identity::generate();
        let public_b64 = STANDARD.encode(identity.public_key().to_bytes());
        let io = IoOptions {
            encoding: Encoding::Base64,
            ..IoOptions::default()
        };
        let ctx = OpContext::new(identity, io);

        let printed = PrintIdentity { show_private: false }
            .execute(&ctx)
            .await
            .unwrap();
        assert!(printed.contains(&public_b64));
    }
}
