//! Types d'erreurs pour le crate igc

use thiserror::Error;

/// Erreurs pouvant survenir lors du parsing IGC
#[derive(Debug, Error)]
pub enum IgcError {
    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Enregistrement illisible (ligne ignorée par le builder)
    #[error("Malformed {kind} record: {reason}")]
    MalformedRecord { kind: char, reason: String },

    /// Aucun point GPS exploitable dans le fichier
    #[error("No valid GPS fixes found")]
    NoValidFixes,
}

impl IgcError {
    /// Crée une erreur d'enregistrement avec contexte
    pub fn malformed(kind: char, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind,
            reason: reason.into(),
        }
    }
}
