//! # igc2kmz
//!
//! Conversion de tracklogs IGC en documents KML/KMZ et fusion de lots
//! d'archives KMZ en un document unique.
//!
//! ## Features
//!
//! - Une trace par archive: ligne colorée, marqueurs de décollage et d'atterrissage
//! - Conversion par dossier avec une couleur par sous-dossier (roue HSV)
//! - Fusion d'archives avec préfixage des styles pour éviter les collisions
//! - Rapports structurés (résumé, console, JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Fichiers isolés, une couleur
//! igc2kmz files vol1.igc vol2.igc --color "#ff8000"
//!
//! # Dossier: une couleur par sous-dossier, sortie dans flights_kmz/
//! igc2kmz folder ./flights
//!
//! # Fusion: flights_kmz_merged.kmz
//! igc2kmz merge ./flights_kmz
//! ```

pub mod batch;
pub mod color;
pub mod config;
pub mod error;
pub mod kml;
pub mod kmz;
pub mod merge;
pub mod report;
pub mod session;

pub use batch::{convert_file, convert_files, convert_folder, scan_groups, Group};
pub use color::{generate_colors, Rgb};
pub use config::Config;
pub use error::ConvertError;
pub use merge::merge_folder;
pub use report::{BatchReport, FileError, MergeReport, RunStatus};
pub use session::{run, Collaborator, Mode, Outcome};
