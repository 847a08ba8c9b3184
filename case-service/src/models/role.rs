//! Office staff roles carried in session tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role claim. Carried through the gateway to handlers; no route branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    SocioSenior,
    Advogado,
    Assistente,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SocioSenior => "SOCIO_SENIOR",
            Role::Advogado => "ADVOGADO",
            Role::Assistente => "ASSISTENTE",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
