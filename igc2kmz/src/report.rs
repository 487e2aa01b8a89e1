//! Rapports de conversion et de fusion
//!
//! Un fichier en échec n'interrompt pas le lot: l'erreur est collectée
//! ici puis restituée dans le résumé, la console ou un fichier JSON.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::color::Rgb;

/// Statut global d'un lot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tous les fichiers traités
    Success,
    /// Au moins un succès et au moins une erreur
    PartialSuccess,
    /// Aucun succès
    Failed,
}

/// Erreur attachée à un fichier d'entrée
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    /// Nom du fichier (sans dossier)
    pub file: String,
    pub message: String,
}

impl FileError {
    pub fn new(file: impl Into<String>, message: impl ToString) -> Self {
        Self {
            file: file.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Groupe d'un lot par dossier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Nom du sous-dossier (vide = racine)
    pub name: String,
    pub color: Rgb,
    pub files: usize,
}

/// Rapport d'un lot de conversion
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Durée du lot
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,

    /// Nombre de fichiers soumis
    pub total: usize,
    /// Nombre de fichiers convertis
    pub converted: usize,

    /// Dossier de sortie (lot par dossier uniquement)
    pub output_root: Option<PathBuf>,
    /// Groupes dans l'ordre de traitement
    pub groups: Vec<GroupSummary>,

    /// Erreurs par fichier, dans l'ordre de traitement
    pub errors: Vec<FileError>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self {
            duration_secs: 0.0,
            status: RunStatus::Success,
            total: 0,
            converted: 0,
            output_root: None,
            groups: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl BatchReport {
    /// Crée un rapport pour `total` fichiers
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Enregistre un fichier converti
    pub fn record_success(&mut self) {
        self.converted += 1;
    }

    /// Enregistre un fichier en échec
    pub fn record_failure(&mut self, file: impl Into<String>, message: impl ToString) {
        self.errors.push(FileError::new(file, message));
    }

    /// Définit la durée du lot
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = status_for(self.converted, self.errors.len());
    }

    /// Nombre de fichiers en échec
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Texte présenté à l'utilisateur en fin de lot
    pub fn summary(&self) -> String {
        let mut msg = format!(
            "Converted {}/{} files successfully.",
            self.converted, self.total
        );

        if let Some(root) = &self.output_root {
            msg.push_str(&format!("\nOutput: {}", root.display()));
        }

        if !self.errors.is_empty() {
            msg.push_str(&format!("\n\n{} error(s):\n", self.errors.len()));
            msg.push_str(&join_lines(&self.errors));
        }

        msg
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Files: {} converted, {} failed, {} total",
            self.converted,
            self.failed(),
            self.total
        );
        if let Some(root) = &self.output_root {
            println!("Output: {}", root.display());
        }

        if !self.groups.is_empty() {
            println!("\n--- GROUPS ---");
            for group in &self.groups {
                let name = if group.name.is_empty() {
                    "(root)"
                } else {
                    group.name.as_str()
                };
                println!("  {} [{}]: {} files", name, group.color, group.files);
            }
        }

        display_errors("ERRORS", &self.errors);

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Rapport d'une fusion d'archives
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    /// Durée de la fusion
    pub duration_secs: f64,
    /// Statut global
    pub status: RunStatus,

    /// Archives rencontrées (y compris ignorées)
    pub archives_seen: usize,
    /// Archives effectivement intégrées
    pub archives_merged: usize,

    /// Noms des dossiers KML créés, dans l'ordre
    pub groups: Vec<String>,
    /// Archives ignorées et raison
    pub skipped: Vec<FileError>,

    /// Archive fusionnée
    pub output: PathBuf,
}

impl MergeReport {
    pub fn new(output: PathBuf) -> Self {
        Self {
            duration_secs: 0.0,
            status: RunStatus::Success,
            archives_seen: 0,
            archives_merged: 0,
            groups: Vec::new(),
            skipped: Vec::new(),
            output,
        }
    }

    /// Enregistre une archive intégrée
    pub fn record_merged(&mut self) {
        self.archives_seen += 1;
        self.archives_merged += 1;
    }

    /// Enregistre une archive ignorée
    pub fn record_skipped(&mut self, file: impl Into<String>, message: impl ToString) {
        self.archives_seen += 1;
        self.skipped.push(FileError::new(file, message));
    }

    /// Définit la durée de la fusion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = status_for(self.archives_merged, self.skipped.len());
    }

    /// Texte présenté à l'utilisateur en fin de fusion
    pub fn summary(&self) -> String {
        let mut msg = format!(
            "Merged {} KMZ files into:\n{}",
            self.archives_seen,
            self.output.display()
        );

        if !self.skipped.is_empty() {
            msg.push_str(&format!("\n\n{} skipped:\n", self.skipped.len()));
            msg.push_str(&join_lines(&self.skipped));
        }

        msg
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("MERGE REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Archives: {} merged, {} skipped, {} seen",
            self.archives_merged,
            self.skipped.len(),
            self.archives_seen
        );
        println!("Folders: {}", self.groups.join(", "));
        println!("Output: {}", self.output.display());

        display_errors("SKIPPED", &self.skipped);

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn status_for(successes: usize, failures: usize) -> RunStatus {
    if failures == 0 {
        RunStatus::Success
    } else if successes > 0 {
        RunStatus::PartialSuccess
    } else {
        RunStatus::Failed
    }
}

fn join_lines(errors: &[FileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn display_errors(title: &str, errors: &[FileError]) {
    if errors.is_empty() {
        return;
    }

    println!("\n--- {} ({}) ---", title, errors.len());
    for e in errors.iter().take(20) {
        println!("  {}", e);
    }
    if errors.len() > 20 {
        println!("  ... and {} more", errors.len() - 20);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_report_default() {
        let report = BatchReport::default();
        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.total, 0);
        assert_eq!(report.converted, 0);
    }

    #[test]
    fn test_file_error_display() {
        let e = FileError::new("a.igc", "No valid GPS fixes found");
        assert_eq!(e.to_string(), "a.igc: No valid GPS fixes found");
    }

    #[test]
    fn test_finalize_success() {
        let mut report = BatchReport::new(1);
        report.record_success();
        report.finalize();
        assert_eq!(report.status, RunStatus::Success);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = BatchReport::new(2);
        report.record_success();
        report.record_failure("b.igc", "boom");
        report.finalize();
        assert_eq!(report.status, RunStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = BatchReport::new(1);
        report.record_failure("b.igc", "boom");
        report.finalize();
        assert_eq!(report.status, RunStatus::Failed);
    }

    #[test]
    fn test_flat_summary() {
        let mut report = BatchReport::new(2);
        report.record_success();
        report.record_success();
        assert_eq!(report.summary(), "Converted 2/2 files successfully.");
    }

    #[test]
    fn test_folder_summary_with_errors() {
        let mut report = BatchReport::new(3);
        report.output_root = Some(PathBuf::from("/flights_kmz"));
        report.record_success();
        report.record_failure("a.igc", "No valid GPS fixes found");
        report.record_failure("b.igc", "I/O error: denied");

        assert_eq!(
            report.summary(),
            "Converted 1/3 files successfully.\nOutput: /flights_kmz\n\n\
             2 error(s):\na.igc: No valid GPS fixes found\nb.igc: I/O error: denied"
        );
    }

    #[test]
    fn test_merge_summary() {
        let mut report = MergeReport::new(PathBuf::from("/flights_merged.kmz"));
        report.record_merged();
        report.record_skipped("bad.kmz", "invalid Zip archive");
        report.finalize();

        assert_eq!(report.archives_seen, 2);
        assert_eq!(report.archives_merged, 1);
        assert_eq!(report.status, RunStatus::PartialSuccess);
        assert_eq!(
            report.summary(),
            "Merged 2 KMZ files into:\n/flights_merged.kmz\n\n1 skipped:\nbad.kmz: invalid Zip archive"
        );
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = BatchReport::new(1);
        report.groups.push(GroupSummary {
            name: "north".to_string(),
            color: Rgb::new(255, 0, 0),
            files: 1,
        });
        report.record_success();
        report.finalize();
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["converted"], 1);
        assert_eq!(json["groups"][0]["color"], "#ff0000");
    }
}
