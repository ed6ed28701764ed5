// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CodigoRepository, UsuarioRepository},
    integrations::notifier::CodeNotifier,
    models::{auth::Claims, usuario::Usuario},
};

pub const CODE_TTL_MINUTES: i64 = 15;
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Código de 6 dígitos, com zeros à esquerda.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}

pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn code_expiration(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(CODE_TTL_MINUTES)
}

#[derive(Clone)]
pub struct AuthService {
    usuario_repo: UsuarioRepository,
    codigo_repo: CodigoRepository,
    notifier: Arc<dyn CodeNotifier>,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        usuario_repo: UsuarioRepository,
        codigo_repo: CodigoRepository,
        notifier: Arc<dyn CodeNotifier>,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { usuario_repo, codigo_repo, notifier, jwt_secret, pool }
    }

    /// Emite um novo código para o e-mail e devolve quando ele expira.
    pub async fn request_code(&self, email: &str) -> Result<DateTime<Utc>, AppError> {
        let email = normalize_email(email);

        self.usuario_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let code = generate_code();
        let code_clone = code.clone();
        let code_hash = tokio::task::spawn_blocking(move || hash(&code_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let expira_em = code_expiration(Utc::now());

        // Só um código pendente por e-mail
        let mut tx = self.pool.begin().await?;
        self.codigo_repo.invalidate_pending(&mut *tx, &email).await?;
        self.codigo_repo.create(&mut *tx, &email, &code_hash, expira_em).await?;
        tx.commit().await?;

        self.notifier.send_code(&email, &code).await?;

        Ok(expira_em)
    }

    /// Valida o código e, se der certo, devolve o token da sessão.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<(String, Usuario), AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::InvalidCode);
        }
        let email = normalize_email(email);

        let pending = self
            .codigo_repo
            .find_pending(&email, Utc::now())
            .await?
            .ok_or(AppError::InvalidCode)?;

        let code_clone = code.to_owned();
        let hash_clone = pending.codigo.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&code_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação do código: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidCode);
        }

        // Uso único: se outra requisição marcou antes, este pedido perde
        if !self.codigo_repo.mark_used(pending.id).await? {
            return Err(AppError::InvalidCode);
        }

        let usuario = self
            .usuario_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tracing::info!("🔓 Login confirmado para {}", email);

        let token = self.create_token(&usuario)?;
        Ok((token, usuario))
    }

    pub async fn validate_token(&self, token: &str) -> Result<Usuario, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        self.usuario_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        encode_token(usuario, &self.jwt_secret, Utc::now())
    }
}

fn encode_token(usuario: &Usuario, secret: &str, now: DateTime<Utc>) -> Result<String, AppError> {
    let expires_at = now + Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: usuario.id,
        email: usuario.email.clone(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}
