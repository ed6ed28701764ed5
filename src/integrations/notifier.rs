// src/integrations/notifier.rs

use async_trait::async_trait;

use crate::common::error::AppError;

// Entrega do código OTP. O envio de e-mail em si fica fora desta aplicação.
#[async_trait]
pub trait CodeNotifier: Send + Sync {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), AppError>;
}

/// Só registra a entrega no log; o código aparece apenas em nível debug.
#[derive(Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl CodeNotifier for TracingNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), AppError> {
        tracing::info!("✉️ Código de verificação enviado para {}", email);
        tracing::debug!("Código para {}: {}", email, code);
        Ok(())
    }
}
