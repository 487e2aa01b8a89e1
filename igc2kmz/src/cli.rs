//! Définition des commandes CLI
//!
//! Chaque sous-commande répond aux questions de la session:
//! - `files`: fichiers isolés + couleur
//! - `folder`: dossier organisé en sous-dossiers
//! - `merge`: dossier d'archives KMZ à fusionner

use std::path::PathBuf;

use clap::Subcommand;
use igc2kmz::{Collaborator, Mode, Rgb};

#[derive(Subcommand)]
pub enum Commands {
    /// Convert IGC files to KMZ next to each input, all in one color
    Files {
        /// IGC files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Track color (#rrggbb); nothing is converted without it
        #[arg(short, long)]
        color: Option<Rgb>,
    },

    /// Convert every IGC file of a folder, one color per subfolder
    Folder {
        /// Folder containing IGC files and/or subfolders of IGC files
        path: PathBuf,
    },

    /// Merge the KMZ files of a folder into <folder>_merged.kmz
    Merge {
        /// Folder containing KMZ files and/or subfolders of KMZ files
        path: PathBuf,
    },
}

/// Session pilotée par les arguments de la ligne de commande
pub struct CliCollaborator {
    command: Option<Commands>,
}

impl CliCollaborator {
    pub fn new(command: Option<Commands>) -> Self {
        Self { command }
    }
}

impl Collaborator for CliCollaborator {
    fn mode(&mut self) -> Option<Mode> {
        self.command.as_ref().map(|command| match command {
            Commands::Files { .. } => Mode::Files,
            Commands::Folder { .. } => Mode::Folder,
            Commands::Merge { .. } => Mode::Merge,
        })
    }

    fn input_files(&mut self) -> Option<Vec<PathBuf>> {
        match &self.command {
            Some(Commands::Files { files, .. }) => Some(files.clone()),
            _ => None,
        }
    }

    fn folder(&mut self) -> Option<PathBuf> {
        match &self.command {
            Some(Commands::Folder { path }) | Some(Commands::Merge { path }) => Some(path.clone()),
            _ => None,
        }
    }

    fn color(&mut self) -> Option<Rgb> {
        match &self.command {
            Some(Commands::Files { color, .. }) => *color,
            _ => None,
        }
    }

    fn show_summary(&mut self, title: &str, message: &str) {
        println!("\n=== {} ===", title);
        println!("{}", message);
    }
}
