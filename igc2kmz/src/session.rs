//! Session interactive: choix du mode puis exécution
//!
//! Les sélecteurs (mode, fichiers, dossier, couleur) et l'affichage du
//! résumé sont fournis par un [`Collaborator`]. Une réponse absente
//! termine la session sans rien produire.

use std::path::PathBuf;

use tracing::info;

use crate::batch;
use crate::color::Rgb;
use crate::config::Config;
use crate::merge;
use crate::report::{BatchReport, MergeReport};
use crate::ConvertError;

/// Titre du résumé après une conversion
pub const CONVERSION_TITLE: &str = "Conversion Complete";
/// Titre du résumé après une fusion
pub const MERGE_TITLE: &str = "Merge Complete";

/// Mode de traitement choisi par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fichiers isolés, une seule couleur
    Files,
    /// Dossier organisé en groupes, une couleur par groupe
    Folder,
    /// Fusion d'archives KMZ
    Merge,
}

/// Interface avec l'utilisateur (dialogues, ligne de commande...)
pub trait Collaborator {
    fn mode(&mut self) -> Option<Mode>;
    fn input_files(&mut self) -> Option<Vec<PathBuf>>;
    fn folder(&mut self) -> Option<PathBuf>;
    fn color(&mut self) -> Option<Rgb>;
    fn show_summary(&mut self, title: &str, message: &str);
}

/// Résultat d'une session
#[derive(Debug)]
pub enum Outcome {
    /// L'utilisateur n'a pas répondu: rien n'a été produit
    Aborted,
    Converted(BatchReport),
    Merged(MergeReport),
}

/// Déroule une session complète
///
/// # Errors
///
/// `ConvertError::NoInputFiles` (dossier sans fichier exploitable) et les
/// erreurs empêchant la production de la sortie. Les échecs par fichier
/// sont dans le rapport.
pub fn run<C: Collaborator + ?Sized>(
    collaborator: &mut C,
    config: &Config,
) -> Result<Outcome, ConvertError> {
    let Some(mode) = collaborator.mode() else {
        info!("No mode selected");
        return Ok(Outcome::Aborted);
    };

    match mode {
        Mode::Files => {
            let files = match collaborator.input_files() {
                Some(files) if !files.is_empty() => files,
                _ => {
                    info!("No input files selected");
                    return Ok(Outcome::Aborted);
                }
            };
            let Some(color) = collaborator.color() else {
                info!("No color selected");
                return Ok(Outcome::Aborted);
            };

            let report = batch::convert_files(&files, color, config);
            collaborator.show_summary(CONVERSION_TITLE, &report.summary());
            Ok(Outcome::Converted(report))
        }
        Mode::Folder => {
            let Some(folder) = collaborator.folder() else {
                info!("No folder selected");
                return Ok(Outcome::Aborted);
            };

            let report = batch::convert_folder(&folder, config)?;
            collaborator.show_summary(CONVERSION_TITLE, &report.summary());
            Ok(Outcome::Converted(report))
        }
        Mode::Merge => {
            let Some(folder) = collaborator.folder() else {
                info!("No folder selected");
                return Ok(Outcome::Aborted);
            };

            let report = merge::merge_folder(&folder, config)?;
            collaborator.show_summary(MERGE_TITLE, &report.summary());
            Ok(Outcome::Merged(report))
        }
    }
}
