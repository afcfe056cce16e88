use std::convert::Infallible;

/// No operation requested: report the identity that was resolved
#[derive(Debug, Clone)]
pub struct Recall;

#[async_trait::async_trait]
impl crate::cli::op::Op for Recall {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let kind = if ctx.identity.has_private_key() {
            "private"
        } else {
            "public"
        };
        Ok(format!("Resolved {} identity {}", kind, ctx.identity))
    }
}
