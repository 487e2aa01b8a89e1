//! Types d'erreurs pour la conversion et la fusion

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors d'une conversion ou d'une fusion
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Erreur de lecture du tracklog (dont l'absence de points)
    #[error(transparent)]
    Igc(#[from] igc::IgcError),

    /// Erreur d'I/O (dossiers de sortie, fichiers)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur de lecture ou d'écriture XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Erreur de lecture ou d'écriture de l'archive KMZ
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Document KML sans élément Document exploitable
    #[error("No Document element in {0}")]
    MissingDocument(PathBuf),

    /// Archive KMZ illisible pendant une fusion
    #[error("Cannot read archive {path}: {reason}")]
    ArchiveRead { path: PathBuf, reason: String },

    /// Aucun fichier à traiter dans le dossier
    #[error("No {kind} files found in {} or its subfolders", path.display())]
    NoInputFiles { kind: String, path: PathBuf },

    /// Couleur illisible (attendu: #rrggbb)
    #[error("Invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

impl ConvertError {
    /// Crée une erreur de lecture d'archive avec contexte
    pub fn archive_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
